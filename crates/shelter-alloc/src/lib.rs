//! Shelter bed allocation: priority ranking, constrained matching, and manual overrides.

pub mod allocation;
pub mod config;
pub mod error;
pub mod storage;
pub mod telemetry;
