//! Egg Farm
//!
//! Owns a directory of eggs and the auto-feeder that routes generated
//! content into them.
//!
//! ## Features
//!
//! - One JSON document per egg, rewritten atomically after every change
//! - Template presets for academic, voice and technical eggs
//! - Auto-feeding guarded by duplicate detection, a quality trend check and
//!   an hourly rate limit, with protection state kept in a sidecar document
//!
//! ## Example
//!
//! ```rust,no_run
//! use eggfarm_farm::prelude::*;
//!
//! # fn main() -> eggfarm_farm::Result<()> {
//! let mut farm = Farm::open("output/egg-farm")?;
//! farm.spawn_from_template(None, EggTemplate::Academic)?;
//!
//! let mut feeder = AutoFeeder::new(farm, FeederConfig::default())?;
//! let result = feeder.auto_feed_compatible_eggs(
//!     "Summarize the evaluation",
//!     "The methodology and analysis of results ...",
//!     "academic",
//!     None,
//! );
//! println!("fed {} eggs", result.total_fed());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod config;
pub mod error;
pub mod farm;
pub mod feeder;
pub mod protection;

pub use config::FeederConfig;
pub use error::{FarmError, Result};
pub use farm::{EggTemplate, Farm, FarmSummary, SpawnResult};
pub use feeder::{
    AutoFeeder, CheckStatus, FedEgg, FeedBatchResult, FeedFailure, Gate, ProtectionChecks,
    ProtectionStatus, Rejection,
};
pub use protection::ProtectionState;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{AutoFeeder, EggTemplate, Farm, FarmError, FeederConfig};
}
