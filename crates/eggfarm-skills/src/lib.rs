//! Egg Farm Skills
//!
//! Decides which registry skills a piece of generated content exercises and
//! how good it looks, without calling any external service.
//!
//! ## Features
//!
//! - Keyword tables per skill, validated when the registry is built
//! - Recall-biased detection: a skill fires when a fifth of its keywords appear
//! - Heuristic quality score in `[0, 9.5]`; 10.0 is left for human ratings

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod registry;
pub mod scoring;

pub use registry::{SkillRegistry, SkillTableError};
pub use scoring::calculate_quality_score;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{calculate_quality_score, SkillRegistry};
}
