// SPDX-License-Identifier: MIT
//! # Scale Plans and Size Presets
//!
//! A [`ScalePlan`] records the input size, the constraint that was applied and the
//! final output size. Plans are cheap value types; compute one per image.
//!
//! All computations use `f64` and round to the nearest integer, clamping every
//! side to at least 1px.

/// A 2D size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    /// Length of the longer side.
    pub fn long_side(self) -> u32 {
        self.w.max(self.h)
    }
}

/// Size constraint applied when planning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScaleTarget {
    /// Clamp the longest side to this value and derive the other side proportionally.
    MaxLongSide(u32),
    /// Fit entirely within the given box, preserving aspect ratio.
    Within(Size),
}

/// Output parameters computed from an input size and a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScalePlan {
    /// Original input dimensions
    pub input: Size,
    /// Constraint used for planning
    pub target: ScaleTarget,
    /// Final output dimensions
    pub out: Size,
}

impl ScalePlan {
    /// True when the output has exactly the input dimensions.
    pub fn is_identity(&self) -> bool {
        self.input == self.out
    }

    /// Number of bytes a packed RGB8 buffer of the output size needs.
    pub fn out_len(&self) -> usize {
        (self.out.w as usize) * (self.out.h as usize) * 3
    }
}

/// Compute a scaling plan. Never upscales.
pub fn build_plan(input: Size, target: ScaleTarget) -> ScalePlan {
    let (w, h) = match target {
        ScaleTarget::MaxLongSide(max_side) => fit_preserve(input, max_side),
        ScaleTarget::Within(bounds) => fit_within(input, bounds),
    };
    ScalePlan {
        input,
        target,
        out: Size { w, h },
    }
}

/// Uniform scale factor `min(1, max_long / long_side)`.
pub fn scale_factor(input: Size, max_long: u32) -> f64 {
    let long = input.long_side() as f64;
    if long == 0.0 {
        return 1.0;
    }
    (max_long as f64 / long).min(1.0)
}

fn fit_preserve(input: Size, max_long: u32) -> (u32, u32) {
    let s = scale_factor(input, max_long);
    apply(input, s)
}

fn fit_within(input: Size, bounds: Size) -> (u32, u32) {
    let (w, h) = (input.w.max(1) as f64, input.h.max(1) as f64);
    let s = (bounds.w as f64 / w).min(bounds.h as f64 / h).min(1.0);
    apply(input, s)
}

fn apply(input: Size, s: f64) -> (u32, u32) {
    let (w, h) = (input.w as f64, input.h as f64);
    (
        ((w * s).round() as u32).max(1),
        ((h * s).round() as u32).max(1),
    )
}

/// Named long-side limits offered on the command line.
///
/// `Catalog` matches what the add-product flow uses for generated images.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SizePreset {
    /// 512px longest side, for thumbnails and previews
    #[clap(name = "thumb")]
    Thumb512,
    /// 1024px longest side, the default for stored products
    #[clap(name = "catalog")]
    Catalog1024,
    /// 2048px longest side, for try-on source photos
    #[clap(name = "large")]
    Large2048,
}

impl SizePreset {
    pub fn max_long_side(self) -> u32 {
        match self {
            SizePreset::Thumb512 => 512,
            SizePreset::Catalog1024 => 1024,
            SizePreset::Large2048 => 2048,
        }
    }

    pub fn to_target(self) -> ScaleTarget {
        ScaleTarget::MaxLongSide(self.max_long_side())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_clamped_to_long_side() {
        let plan = build_plan(Size { w: 1920, h: 1080 }, ScaleTarget::MaxLongSide(640));
        assert_eq!(plan.out, Size { w: 640, h: 360 });
    }

    #[test]
    fn test_portrait_clamped_to_long_side() {
        let plan = build_plan(Size { w: 1000, h: 3000 }, ScaleTarget::MaxLongSide(1024));
        assert_eq!(plan.out.h, 1024);
        assert_eq!(plan.out.w, 341);
    }

    #[test]
    fn test_never_upscales() {
        let input = Size { w: 300, h: 200 };
        let plan = build_plan(input, ScaleTarget::MaxLongSide(1024));
        assert!(plan.is_identity());
    }

    #[test]
    fn test_extreme_aspect_keeps_one_pixel() {
        let plan = build_plan(Size { w: 10_000, h: 1 }, ScaleTarget::MaxLongSide(100));
        assert_eq!(plan.out, Size { w: 100, h: 1 });
    }

    #[test]
    fn test_within_box() {
        let plan = build_plan(
            Size { w: 800, h: 400 },
            ScaleTarget::Within(Size { w: 200, h: 200 }),
        );
        assert_eq!(plan.out, Size { w: 200, h: 100 });
    }

    #[test]
    fn test_presets() {
        assert_eq!(SizePreset::Catalog1024.to_target(), ScaleTarget::MaxLongSide(1024));
        assert_eq!(SizePreset::Thumb512.max_long_side(), 512);
    }
}
