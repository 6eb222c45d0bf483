//! Text measurement and rasterization into coverage masks
use crate::{AlphaMask, Image, ImageMut, OptionError, RenderError, Result, Scalar, Shape, Size};
use std::{collections::BTreeSet, fmt, path::Path, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextStyle {
    #[default]
    Regular,
    Bold,
    Italic,
    Underline,
}

impl FromStr for TextStyle {
    type Err = OptionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "r" | "regular" => Ok(Self::Regular),
            "b" | "bold" => Ok(Self::Bold),
            "i" | "italic" => Ok(Self::Italic),
            "u" | "underline" => Ok(Self::Underline),
            _ => Err(OptionError::new(value, "r/regular, b/bold, i/italic or u/underline")),
        }
    }
}

impl fmt::Display for TextStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Anchor of the text block, applied identically to both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextAlignment {
    /// Anchored at padding from the top-left edge
    Near,
    /// Anchored at the middle of the bounds
    #[default]
    Center,
    /// Anchored at padding from the bottom-right edge
    Far,
}

impl FromStr for TextAlignment {
    type Err = OptionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "n" | "near" | "l" | "left" => Ok(Self::Near),
            "c" | "center" => Ok(Self::Center),
            "f" | "far" | "r" | "right" => Ok(Self::Far),
            _ => Err(OptionError::new(value, "n/near/l/left, c/center or f/far/r/right")),
        }
    }
}

impl fmt::Display for TextAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Vertical metrics of a line, `ascent` and `descent` are both positive distances from the baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    pub ascent: Scalar,
    pub descent: Scalar,
    /// Distance between baselines of consecutive lines
    pub height: Scalar,
}

/// Rasterized glyph
#[derive(Debug, Clone)]
pub struct Glyph {
    /// Horizontal offset of the mask from the pen position
    pub left: i64,
    /// Vertical offset of the mask from the baseline (negative is above)
    pub top: i64,
    pub mask: AlphaMask,
}

/// Single font face at any size
pub trait Typeface {
    fn line_metrics(&self, size: Scalar) -> LineMetrics;

    fn advance(&self, ch: char, size: Scalar) -> Scalar;

    fn kerning(&self, _left: char, _right: char, _size: Scalar) -> Scalar {
        0.0
    }

    fn glyph(&self, ch: char, size: Scalar) -> Glyph;
}

/// Font lookup by family name and style
pub trait FontSource {
    /// Fails with [`RenderError::FontNotFound`] if there is no such family,
    /// no substitute family is ever used.
    fn typeface(&self, family: &str, style: TextStyle) -> Result<Box<dyn Typeface>>;
}

/// Installed fonts discovered with `fontdb` and rasterized with `fontdue`
pub struct SystemFonts {
    db: fontdb::Database,
}

impl SystemFonts {
    pub fn new() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!("[fonts] {} faces loaded", db.len());
        Self { db }
    }

    /// Database without any fonts
    pub fn empty() -> Self {
        Self {
            db: fontdb::Database::new(),
        }
    }

    /// Register font file in addition to installed fonts
    pub fn load_font_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.db
            .load_font_file(path)
            .map_err(|error| RenderError::FontLoad(format!("{}: {}", path.display(), error)))
    }

    /// Sorted list of all known family names
    pub fn families(&self) -> Vec<String> {
        let families: BTreeSet<_> = self
            .db
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
            .collect();
        families.into_iter().collect()
    }

    /// Known family name equal to `family` ignoring case, exact match wins
    fn family_name(&self, family: &str) -> Option<String> {
        let families = self.families();
        if families.iter().any(|name| name == family) {
            return Some(family.to_owned());
        }
        let lower = family.to_lowercase();
        families.into_iter().find(|name| name.to_lowercase() == lower)
    }
}

impl Default for SystemFonts {
    fn default() -> Self {
        Self::new()
    }
}

impl FontSource for SystemFonts {
    fn typeface(&self, family: &str, style: TextStyle) -> Result<Box<dyn Typeface>> {
        let not_found = || RenderError::FontNotFound {
            family: family.to_owned(),
            style,
        };
        let name = self.family_name(family).ok_or_else(not_found)?;
        let families = [fontdb::Family::Name(&name)];
        let query = fontdb::Query {
            families: &families,
            weight: match style {
                TextStyle::Bold => fontdb::Weight::BOLD,
                _ => fontdb::Weight::NORMAL,
            },
            style: match style {
                TextStyle::Italic => fontdb::Style::Italic,
                _ => fontdb::Style::Normal,
            },
            ..Default::default()
        };
        let id = self.db.query(&query).ok_or_else(not_found)?;
        let font = self
            .db
            .with_face_data(id, |data, index| {
                let settings = fontdue::FontSettings {
                    collection_index: index,
                    ..Default::default()
                };
                fontdue::Font::from_bytes(data, settings)
            })
            .ok_or_else(not_found)?
            .map_err(|error| RenderError::FontLoad(format!("{} ({}): {}", family, style, error)))?;
        Ok(Box::new(FontdueFace { font }))
    }
}

struct FontdueFace {
    font: fontdue::Font,
}

impl Typeface for FontdueFace {
    fn line_metrics(&self, size: Scalar) -> LineMetrics {
        match self.font.horizontal_line_metrics(size as f32) {
            Some(metrics) => LineMetrics {
                ascent: metrics.ascent as Scalar,
                descent: -metrics.descent as Scalar,
                height: metrics.new_line_size as Scalar,
            },
            None => LineMetrics {
                ascent: 0.8 * size,
                descent: 0.2 * size,
                height: size,
            },
        }
    }

    fn advance(&self, ch: char, size: Scalar) -> Scalar {
        self.font.metrics(ch, size as f32).advance_width as Scalar
    }

    fn kerning(&self, left: char, right: char, size: Scalar) -> Scalar {
        self.font
            .horizontal_kern(left, right, size as f32)
            .unwrap_or(0.0) as Scalar
    }

    fn glyph(&self, ch: char, size: Scalar) -> Glyph {
        let (metrics, coverage) = self.font.rasterize(ch, size as f32);
        let shape = Shape::packed(Size::new(metrics.width, metrics.height));
        Glyph {
            left: metrics.xmin as i64,
            // fontdue reports the bottom of the bitmap relative to the baseline, y up
            top: -(metrics.ymin as i64 + metrics.height as i64),
            mask: AlphaMask::new(
                shape,
                coverage.into_iter().map(|c| c as Scalar / 255.0).collect(),
            ),
        }
    }
}

/// Lays out and rasterizes text with a fixed face, size and style.
///
/// Lines are separated by `\n`, there is no wrapping.
pub struct TextShaper {
    face: Box<dyn Typeface>,
    size: Scalar,
    style: TextStyle,
}

impl TextShaper {
    pub fn new(
        fonts: &dyn FontSource,
        family: &str,
        size: Scalar,
        style: TextStyle,
    ) -> Result<Self> {
        let face = fonts.typeface(family, style)?;
        Ok(Self::from_typeface(face, size, style))
    }

    pub fn from_typeface(face: Box<dyn Typeface>, size: Scalar, style: TextStyle) -> Self {
        Self { face, size, style }
    }

    pub fn size(&self) -> Scalar {
        self.size
    }

    pub fn style(&self) -> TextStyle {
        self.style
    }

    fn line_width(&self, line: &str) -> Scalar {
        let mut width = 0.0;
        let mut prev = None;
        for ch in line.chars() {
            if let Some(prev) = prev {
                width += self.face.kerning(prev, ch, self.size);
            }
            width += self.face.advance(ch, self.size);
            prev = Some(ch);
        }
        width
    }

    /// Natural size of the text block, widest line by the sum of line heights
    pub fn measure(&self, text: &str) -> Size {
        if text.is_empty() {
            return Size::default();
        }
        let metrics = self.face.line_metrics(self.size);
        let (count, width) = text
            .split('\n')
            .fold((0usize, 0.0 as Scalar), |(count, width), line| {
                (count + 1, width.max(self.line_width(line)))
            });
        Size::new(
            width.ceil().max(0.0) as usize,
            (count as Scalar * metrics.height).ceil().max(0.0) as usize,
        )
    }

    /// Underline bar thickness in pixels
    fn underline_thickness(&self) -> usize {
        ((self.size / 14.0) as usize).max(1)
    }

    /// Coverage mask of the text anchored inside `bounds` according to `alignment`.
    ///
    /// `padding` is the distance from the edge used by `Near` and `Far`
    /// anchors. Each line is aligned on its own within the block.
    pub fn rasterize(
        &self,
        text: &str,
        alignment: TextAlignment,
        bounds: Size,
        padding: Size,
    ) -> AlphaMask {
        let mut mask = AlphaMask::new_default(bounds);
        if text.is_empty() || bounds.is_empty() {
            return mask;
        }
        let metrics = self.face.line_metrics(self.size);
        let block = self.measure(text);
        let (bw, bh) = (bounds.width as Scalar, bounds.height as Scalar);
        let top = match alignment {
            TextAlignment::Near => padding.height as Scalar,
            TextAlignment::Center => bh / 2.0 - block.height as Scalar / 2.0,
            TextAlignment::Far => bh - padding.height as Scalar - block.height as Scalar,
        };

        for (index, line) in text.split('\n').enumerate() {
            let width = self.line_width(line);
            let left = match alignment {
                TextAlignment::Near => padding.width as Scalar,
                TextAlignment::Center => bw / 2.0 - width / 2.0,
                TextAlignment::Far => bw - padding.width as Scalar - width,
            };
            let baseline = (top + index as Scalar * metrics.height + metrics.ascent).round() as i64;

            let mut pen = left;
            let mut prev = None;
            for ch in line.chars() {
                if let Some(prev) = prev {
                    pen += self.face.kerning(prev, ch, self.size);
                }
                let glyph = self.face.glyph(ch, self.size);
                let x = pen.round() as i64 + glyph.left;
                let y = baseline + glyph.top;
                blit_max(&mut mask, &glyph.mask, x, y);
                pen += self.face.advance(ch, self.size);
                prev = Some(ch);
            }

            if self.style == TextStyle::Underline && width > 0.0 {
                let thickness = self.underline_thickness();
                let bar_size = Size::new(width.round() as usize, thickness);
                let bar = AlphaMask::new_with(bar_size, |_, _| 1.0);
                blit_max(&mut mask, &bar, left.round() as i64, baseline + thickness as i64);
            }
        }
        mask
    }
}

/// Combine coverage of `src` placed at `(x, y)` into `dst` with `max`
fn blit_max(dst: &mut AlphaMask, src: &AlphaMask, x: i64, y: i64) {
    let (width, height) = (dst.width() as i64, dst.height() as i64);
    for row in 0..src.height() {
        let dy = y + row as i64;
        if dy < 0 || dy >= height {
            continue;
        }
        for col in 0..src.width() {
            let dx = x + col as i64;
            if dx < 0 || dx >= width {
                continue;
            }
            let coverage = src.get(row, col).copied().unwrap_or(0.0);
            if let Some(value) = dst.get_mut(dy as usize, dx as usize) {
                *value = value.max(coverage);
            }
        }
    }
}
