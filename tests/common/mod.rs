#![allow(dead_code)]

use fancytext::{
    AlphaMask, FontSource, Glyph, LineMetrics, PixelBuffer, RenderError, Result, Scalar, Size,
    TextStyle, Typeface,
};
use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

pub const FAMILY: &str = "Blocks";

/// Monospaced face where every glyph except space is a solid block,
/// `size / 2` wide and `3/4 size` tall, resting on the baseline
pub struct BlockFace;

impl Typeface for BlockFace {
    fn line_metrics(&self, size: Scalar) -> LineMetrics {
        LineMetrics {
            ascent: 0.75 * size,
            descent: 0.25 * size,
            height: size,
        }
    }

    fn advance(&self, _ch: char, size: Scalar) -> Scalar {
        size / 2.0
    }

    fn glyph(&self, ch: char, size: Scalar) -> Glyph {
        let ascent = (0.75 * size) as usize;
        let size = if ch.is_whitespace() {
            Size::default()
        } else {
            Size::new((size / 2.0) as usize, ascent)
        };
        Glyph {
            left: 0,
            top: -(ascent as i64),
            mask: AlphaMask::new_with(size, |_, _| 1.0),
        }
    }
}

/// Font source that only knows the block face
pub struct BlockFonts;

impl FontSource for BlockFonts {
    fn typeface(&self, family: &str, style: TextStyle) -> Result<Box<dyn Typeface>> {
        if family == FAMILY {
            Ok(Box::new(BlockFace))
        } else {
            Err(RenderError::FontNotFound {
                family: family.to_owned(),
                style,
            })
        }
    }
}

/// Fresh directory for a single test
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "fancytext-test-{}-{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("failed to create scratch directory");
    dir
}

pub fn write_image(dir: &Path, name: &str, image: &PixelBuffer) -> String {
    let path = dir.join(name);
    let file = File::create(&path).expect("failed to create image file");
    image
        .write_png(BufWriter::new(file))
        .expect("failed to encode image");
    path.to_string_lossy().into_owned()
}
