//! Deterministic odds → scoreline-probability pipeline.
//!
//! normalize → weight by goal differential → bias by team strength →
//! correct draws → renormalize → pick + confidence.

pub mod balance;
pub mod confidence;
pub mod differential;
pub mod inference;
pub mod odds;
pub mod strength;

pub use inference::InferenceEngine;
