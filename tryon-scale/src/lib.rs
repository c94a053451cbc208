// SPDX-License-Identifier: MIT
//! # tryon-scale: Scale Planning and CPU Resizing for Catalog Images
//!
//! This crate holds the pixel-level half of the image compression pipeline used by
//! the try-on studio. It knows nothing about base64, data URIs or codecs; callers
//! hand it packed RGB8 buffers and a plan, and get packed RGB8 buffers back.
//!
//! ## Key Components
//!
//! - [`presets`]: Scale plan computation and the named size presets exposed on the CLI
//! - [`cpu`]: CPU resizing built on `fast_image_resize` (SIMD-accelerated)
//!
//! ## Sizing Rules
//!
//! - The longest side is clamped to the target; the other side follows proportionally
//! - Images already within the target are never upscaled
//! - Every output side is at least 1px
//!
//! ## Usage Example
//!
//! ```rust
//! use tryon_scale::{cpu::scale_rgb_cpu, presets::{build_plan, ScaleTarget, Size}};
//!
//! let input = Size { w: 2048, h: 1536 };
//! let plan = build_plan(input, ScaleTarget::MaxLongSide(1024));
//! assert_eq!((plan.out.w, plan.out.h), (1024, 768));
//!
//! let src = vec![127u8; (input.w * input.h * 3) as usize];
//! let mut dst = vec![0u8; plan.out_len()];
//! let mut resizer = fast_image_resize::Resizer::new();
//! scale_rgb_cpu(&mut resizer, &src, &plan, &mut dst).unwrap();
//! ```

pub mod cpu;
pub mod presets;
