//! Rendering core for stylized raster images.
//!
//! Main features:
//!  - Multi-stop linear gradients in four directions
//!  - Gradient filled text with optional image texture and background
//!  - Gradient silhouettes cut out from grayscale images
//!  - Image colorization with translucent gradients or blend images
//!
//! Rendering is driven by a flat [`RenderOptions`] mapping, see [`RenderRequest`].

mod color;
mod compositor;
mod error;
mod geometry;
mod grad;
mod image;
mod options;
mod pipeline;
mod storage;
mod text;

pub use crate::image::{AlphaMask, Image, ImageIter, ImageMut, ImageOwned, PixelBuffer, Shape};
pub use color::{ColorError, ColorResolver, RGBA};
pub use compositor::{Compositor, Placement, ScalingMode, cutout_mask, luma_threshold};
pub use error::{RenderError, Result};
pub use geometry::{EPSILON, Point, Rect, Scalar, Size};
pub use grad::{GradLinear, GradStop, GradStops, GradientDirection, Paint};
pub use options::{OptionError, RenderOptions};
pub use pipeline::{
    ColorizeOptions, GradientImageOptions, GradientTextOptions, Pipeline, PipelineKind,
    RenderRequest, Rendered,
};
pub use storage::{FileStorage, OutputTarget, Storage, default_directory};
pub use text::{
    FontSource, Glyph, LineMetrics, SystemFonts, TextAlignment, TextShaper, TextStyle, Typeface,
};

#[cfg(test)]
#[macro_export]
macro_rules! assert_approx_eq {
    ( $v0:expr, $v1: expr ) => {{
        assert!(($v0 - $v1).abs() < $crate::EPSILON, "{} != {}", $v0, $v1);
    }};
    ( $v0:expr, $v1: expr, $e: expr ) => {{
        assert!(($v0 - $v1).abs() < $e, "{} != {}", $v0, $v1);
    }};
}
