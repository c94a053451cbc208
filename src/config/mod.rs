//! # Configuration Module
//!
//! Configuration structures and validation for the studio: where data lives, how
//! much each string tier may hold, how images are compressed and which remote
//! credentials are available.

#[allow(clippy::module_inception)]
pub mod config;

pub use config::StudioConfig;
