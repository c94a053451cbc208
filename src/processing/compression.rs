//! # Image Compression
//!
//! Shrinks base64 images before they are embedded in stored products:
//!
//! 1. decode the base64 body and the raster behind it
//! 2. plan a uniform scale of `min(1, max_dimension / long_side)`
//! 3. resize on the CPU (no-op when the plan is the identity)
//! 4. re-encode as JPEG at the requested quality
//!
//! [`compress`] never fails: any problem along the way hands back the input
//! unchanged. [`Compressor::try_compress`] exposes the error for callers that want it.

use fast_image_resize::Resizer;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use tracing::debug;
use tryon_scale::cpu::scale_rgb_to_vec;
use tryon_scale::presets::{ScaleTarget, Size, build_plan};

use super::payload::ImagePayload;
use crate::error::{StudioError, StudioResult};

pub const DEFAULT_MAX_DIMENSION: u32 = 1024;
pub const DEFAULT_QUALITY: f32 = 0.85;
pub const OUTPUT_MIME: &str = "image/jpeg";

/// Result of a successful compression.
#[derive(Debug, Clone)]
pub struct Compressed {
    pub payload: ImagePayload,
    pub input: Size,
    pub output: Size,
}

/// Reusable compressor. Holds its resizer so repeated calls share scratch state.
pub struct Compressor {
    resizer: Resizer,
    max_dimension: u32,
    quality: f32,
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DIMENSION, DEFAULT_QUALITY)
    }
}

impl Compressor {
    pub fn new(max_dimension: u32, quality: f32) -> Self {
        Self {
            resizer: Resizer::new(),
            max_dimension,
            quality,
        }
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Compress, or return a clone of `image` if anything fails.
    pub fn compress(&mut self, image: &ImagePayload) -> ImagePayload {
        match self.try_compress(image) {
            Ok(done) => done.payload,
            Err(e) => {
                debug!(error = %e, mime = %image.mime_type, "compression failed, keeping original");
                image.clone()
            }
        }
    }

    /// Compress, surfacing the first failure.
    pub fn try_compress(&mut self, image: &ImagePayload) -> StudioResult<Compressed> {
        if self.max_dimension == 0 {
            return Err(StudioError::validation("max_dimension", "must be greater than 0", "0"));
        }
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return Err(StudioError::validation(
                "quality",
                "must be in (0, 1]",
                self.quality.to_string(),
            ));
        }

        let bytes = image.decode_bytes()?;
        let decoded = image::load_from_memory(&bytes)?;
        let rgb = decoded.to_rgb8();
        let input = Size {
            w: rgb.width(),
            h: rgb.height(),
        };
        if input.w == 0 || input.h == 0 {
            return Err(StudioError::codec("decode", "image has no pixels"));
        }

        let plan = build_plan(input, ScaleTarget::MaxLongSide(self.max_dimension));
        let scaled = if plan.is_identity() {
            rgb
        } else {
            let buf = scale_rgb_to_vec(&mut self.resizer, rgb.as_raw(), &plan)?;
            RgbImage::from_raw(plan.out.w, plan.out.h, buf)
                .ok_or_else(|| StudioError::codec("resize", "scaled buffer does not match plan"))?
        };

        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, jpeg_quality(self.quality)).write_image(
            scaled.as_raw(),
            scaled.width(),
            scaled.height(),
            ExtendedColorType::Rgb8,
        )?;

        debug!(
            from = %format!("{}x{}", input.w, input.h),
            to = %format!("{}x{}", plan.out.w, plan.out.h),
            in_bytes = bytes.len(),
            out_bytes = encoded.len(),
            "compressed image"
        );

        Ok(Compressed {
            payload: ImagePayload::from_bytes(&encoded, OUTPUT_MIME),
            input,
            output: plan.out,
        })
    }
}

/// One-shot compression. Returns `image` unchanged on any failure.
pub fn compress(image: &ImagePayload, max_dimension: u32, quality: f32) -> ImagePayload {
    Compressor::new(max_dimension, quality).compress(image)
}

fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jpeg_quality_mapping() {
        assert_eq!(jpeg_quality(0.85), 85);
        assert_eq!(jpeg_quality(1.0), 100);
        assert_eq!(jpeg_quality(0.001), 1);
    }

    #[test]
    fn test_invalid_parameters_return_input() {
        let input = ImagePayload::new("not an image", "image/png");
        assert_eq!(compress(&input, 0, 0.8), input);
        assert_eq!(compress(&input, 100, 0.0), input);
        assert_eq!(compress(&input, 100, f32::NAN), input);
    }
}
