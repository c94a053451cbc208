//! # Processing Module
//!
//! Image payload handling and the compression pipeline that keeps stored product
//! images small.

pub mod compression;
pub mod payload;

pub use compression::{Compressed, Compressor, DEFAULT_MAX_DIMENSION, DEFAULT_QUALITY, compress};
pub use payload::ImagePayload;
