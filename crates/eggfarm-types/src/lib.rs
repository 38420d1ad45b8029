//! Egg Farm Types - Core types shared by the egg farm crates
//!
//! This module defines the skill registry, the training example record and
//! the content fingerprints used to identify examples.

pub mod example;
pub mod fingerprint;
pub mod skill;

pub use example::TrainingExample;
pub use fingerprint::{content_hash, example_id};
pub use skill::{Skill, UnknownSkill};
