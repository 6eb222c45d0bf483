use crate::{
    AlphaMask, Image, ImageMut, OptionError, Paint, PixelBuffer, Point, RGBA, Rect, Scalar, Size,
};
use std::{fmt, str::FromStr};

/// Aspect ratio policy used to fit a source image into a target rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScalingMode {
    /// Keep native size
    #[default]
    None,
    /// Match target width, keep aspect ratio
    Width,
    /// Match target height, keep aspect ratio
    Height,
    /// Stretch to the target size
    Both,
}

impl FromStr for ScalingMode {
    type Err = OptionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "n" | "none" => Ok(Self::None),
            "w" | "width" => Ok(Self::Width),
            "h" | "height" => Ok(Self::Height),
            "b" | "both" => Ok(Self::Both),
            _ => Err(OptionError::new(value, "n/none, w/width, h/height or b/both")),
        }
    }
}

impl fmt::Display for ScalingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Where and how big a source image is drawn inside a target rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub mode: ScalingMode,
    /// Additional `[x, y]` scale factors applied after `mode`
    pub scale: [Scalar; 2],
    /// `[x, y]` fractions of the free space left of and above the image
    pub offset: [Scalar; 2],
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            mode: ScalingMode::None,
            scale: [1.0, 1.0],
            offset: [0.0, 0.0],
        }
    }
}

impl Placement {
    /// Size of the drawn image, fractional pixels are truncated
    pub fn drawn_size(&self, source: Size, target: Size) -> Size {
        let size = match self.mode {
            ScalingMode::None => source,
            ScalingMode::Both => target,
            ScalingMode::Width if source.width > 0 => Size::new(
                target.width,
                source.height * target.width / source.width,
            ),
            ScalingMode::Height if source.height > 0 => Size::new(
                source.width * target.height / source.height,
                target.height,
            ),
            _ => Size::default(),
        };
        let [sx, sy] = self.scale;
        Size::new(
            (size.width as Scalar * sx.max(0.0)) as usize,
            (size.height as Scalar * sy.max(0.0)) as usize,
        )
    }

    /// Destination rectangle of the source image inside the target
    ///
    /// Offset `0.5` centers the image, `0.0` and `1.0` pin it to the edges.
    pub fn place(&self, source: Size, target: Rect) -> Rect {
        let size = self.drawn_size(source, target.size());
        let [ox, oy] = self.offset;
        let x = ((target.width as Scalar - size.width as Scalar) * ox) as i64;
        let y = ((target.height as Scalar - size.height as Scalar) * oy) as i64;
        Rect::new(target.x + x, target.y + y, size.width, size.height)
    }
}

/// Bilinear sample at fractional pixel coordinates, edges are clamped
fn sample(image: &impl Image<Pixel = RGBA>, x: Scalar, y: Scalar) -> RGBA {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return RGBA::TRANSPARENT;
    }
    let x = x.clamp(0.0, (width - 1) as Scalar);
    let y = y.clamp(0.0, (height - 1) as Scalar);
    let (x0, y0) = (x.floor() as usize, y.floor() as usize);
    let (fx, fy) = (x - x0 as Scalar, y - y0 as Scalar);
    let pixel = |row: usize, col: usize| image.get(row, col).copied().unwrap_or_default();
    if fx == 0.0 && fy == 0.0 {
        return pixel(y0, x0);
    }
    let (x1, y1) = ((x0 + 1).min(width - 1), (y0 + 1).min(height - 1));
    let taps = [
        (pixel(y0, x0), (1.0 - fx) * (1.0 - fy)),
        (pixel(y0, x1), fx * (1.0 - fy)),
        (pixel(y1, x0), (1.0 - fx) * fy),
        (pixel(y1, x1), fx * fy),
    ];
    // interpolate premultiplied values to avoid dark fringes
    let mut acc = [0.0; 4];
    for (color, weight) in taps {
        let [r, g, b, a] = color.to_rgba().map(|c| c as Scalar);
        let wa = weight * a / 255.0;
        acc[0] += r * wa;
        acc[1] += g * wa;
        acc[2] += b * wa;
        acc[3] += a * weight;
    }
    if acc[3] <= 0.0 {
        return RGBA::TRANSPARENT;
    }
    let unmul = |c: Scalar| (c * 255.0 / acc[3] + 0.5).clamp(0.0, 255.0) as u8;
    RGBA::new(
        unmul(acc[0]),
        unmul(acc[1]),
        unmul(acc[2]),
        (acc[3] + 0.5).clamp(0.0, 255.0) as u8,
    )
}

/// Image used as a paint, points outside of the image are transparent
impl Paint for PixelBuffer {
    fn at(&self, point: Point) -> RGBA {
        if point.x() < 0.0 || point.y() < 0.0 {
            return RGBA::TRANSPARENT;
        }
        self.get(point.y() as usize, point.x() as usize)
            .copied()
            .unwrap_or_default()
    }
}

/// Owns a pixel buffer and draws into it.
///
/// The buffer is moved in on construction and moved out by `finish`, there
/// is never more than one owner of the pixels.
pub struct Compositor {
    buffer: PixelBuffer,
}

impl Compositor {
    /// Transparent canvas of the given size
    pub fn new(size: Size) -> Self {
        Self {
            buffer: PixelBuffer::new_default(size),
        }
    }

    /// Draw on top of an existing image
    pub fn from_image(buffer: PixelBuffer) -> Self {
        Self { buffer }
    }

    pub fn size(&self) -> Size {
        self.buffer.size()
    }

    /// Rectangle covering the whole buffer
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.size())
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn finish(self) -> PixelBuffer {
        self.buffer
    }

    /// Blend paint over the rectangle, paint is sampled at pixel centers
    pub fn fill(&mut self, rect: Rect, paint: &dyn Paint) {
        let (cols, rows) = rect.clip(self.size());
        for row in rows {
            for col in cols.clone() {
                let color = paint.at(pixel_center(row, col));
                if let Some(pixel) = self.buffer.get_mut(row, col) {
                    *pixel = pixel.blend_over(color);
                }
            }
        }
    }

    /// Blend paint over pixels selected by the mask, mask coverage scales paint alpha
    pub fn fill_masked(&mut self, mask: &AlphaMask, paint: &dyn Paint) {
        let size = self.size();
        let (cols, rows) = Rect::from_size(mask.size()).clip(size);
        for row in rows {
            for col in cols.clone() {
                let coverage = mask.get(row, col).copied().unwrap_or(0.0);
                if coverage <= 0.0 {
                    continue;
                }
                let color = paint.at(pixel_center(row, col)).scale_alpha(coverage);
                if let Some(pixel) = self.buffer.get_mut(row, col) {
                    *pixel = pixel.blend_over(color);
                }
            }
        }
    }

    /// Draw source image resampled into `dest`, with its alpha multiplied by `opacity`
    pub fn draw_image(&mut self, source: &impl Image<Pixel = RGBA>, dest: Rect, opacity: Scalar) {
        if dest.is_empty() || source.size().is_empty() || opacity <= 0.0 {
            return;
        }
        let sx = source.width() as Scalar / dest.width as Scalar;
        let sy = source.height() as Scalar / dest.height as Scalar;
        let (cols, rows) = dest.clip(self.size());
        for row in rows {
            let v = ((row as i64 - dest.y) as Scalar + 0.5) * sy - 0.5;
            for col in cols.clone() {
                let u = ((col as i64 - dest.x) as Scalar + 0.5) * sx - 0.5;
                let color = sample(source, u, v).scale_alpha(opacity);
                if let Some(pixel) = self.buffer.get_mut(row, col) {
                    *pixel = pixel.blend_over(color);
                }
            }
        }
    }

    /// Multiply alpha by mask coverage, zero coverage makes pixel fully transparent
    pub fn cut_out(&mut self, mask: &AlphaMask) {
        let size = self.size();
        for row in 0..size.height {
            for col in 0..size.width {
                let coverage = mask.get(row, col).copied().unwrap_or(1.0);
                if let Some(pixel) = self.buffer.get_mut(row, col) {
                    *pixel = if coverage <= 0.0 {
                        RGBA::TRANSPARENT
                    } else {
                        pixel.scale_alpha(coverage)
                    };
                }
            }
        }
    }
}

#[inline]
fn pixel_center(row: usize, col: usize) -> Point {
    Point::new(col as Scalar + 0.5, row as Scalar + 0.5)
}

/// Convert to grayscale with luma weights and threshold against `cutoff` in [0, 1].
///
/// Every color channel becomes 255 when luma is above `cutoff * 255` and 0
/// otherwise, alpha is preserved.
pub fn luma_threshold(image: &impl Image<Pixel = RGBA>, cutoff: Scalar) -> PixelBuffer {
    let level = cutoff.clamp(0.0, 1.0) * 255.0;
    PixelBuffer::new_with(image.size(), |row, col| {
        let color = image.get(row, col).copied().unwrap_or_default();
        let value = if color.luma() > level { 255 } else { 0 };
        RGBA::new(value, value, value, color.alpha())
    })
}

/// Silhouette mask of a thresholded image.
///
/// Pixels exactly equal to opaque white (opaque black when `invert`) get
/// coverage 0, all other pixels get coverage 1.
pub fn cutout_mask(gray: &impl Image<Pixel = RGBA>, invert: bool) -> AlphaMask {
    let blank = if invert { RGBA::BLACK } else { RGBA::WHITE };
    AlphaMask::new_with(gray.size(), |row, col| {
        match gray.get(row, col) {
            Some(color) if *color == blank => 0.0,
            _ => 1.0,
        }
    })
}
