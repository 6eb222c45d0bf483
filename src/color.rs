use crate::Scalar;
use rand::{Rng, RngCore};
use std::{collections::HashMap, fmt, str::FromStr, sync::OnceLock};

/// Straight (not premultiplied) sRGBA color with 8-bit channels
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[derive(bytemuck::Pod, bytemuck::Zeroable)]
#[repr(transparent)]
pub struct RGBA([u8; 4]);

impl RGBA {
    pub const TRANSPARENT: RGBA = RGBA::new(0, 0, 0, 0);
    pub const WHITE: RGBA = RGBA::new(255, 255, 255, 255);
    pub const BLACK: RGBA = RGBA::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    pub const fn red(self) -> u8 {
        self.0[0]
    }

    pub const fn green(self) -> u8 {
        self.0[1]
    }

    pub const fn blue(self) -> u8 {
        self.0[2]
    }

    pub const fn alpha(self) -> u8 {
        self.0[3]
    }

    pub const fn to_rgba(self) -> [u8; 4] {
        self.0
    }

    /// sRGB channels, alpha is discarded
    pub const fn to_rgb(self) -> [u8; 3] {
        let [r, g, b, _] = self.0;
        [r, g, b]
    }

    /// Replace alpha channel
    pub const fn with_alpha(self, alpha: u8) -> Self {
        let [r, g, b, _] = self.0;
        Self([r, g, b, alpha])
    }

    /// Multiply alpha channel by `scale` (clamped to [0, 1])
    pub fn scale_alpha(self, scale: Scalar) -> Self {
        let scale = scale.clamp(0.0, 1.0);
        self.with_alpha(channel(self.alpha() as Scalar * scale))
    }

    /// Luma with the NTSC weights `0.299R + 0.587G + 0.114B`, in [0, 255]
    pub fn luma(self) -> Scalar {
        let [r, g, b] = self.to_rgb();
        0.299 * r as Scalar + 0.587 * g as Scalar + 0.114 * b as Scalar
    }

    /// Pick color that produces the best contrast with self
    pub fn best_contrast(self, c0: Self, c1: Self) -> Self {
        let luma = self.luma();
        if (luma - c0.luma()).abs() < (luma - c1.luma()).abs() {
            c1
        } else {
            c0
        }
    }

    /// Channel-wise linear interpolation, alpha included.
    ///
    /// `t == 0.0` returns `self` and `t == 1.0` returns `other` exactly.
    pub fn lerp(self, other: Self, t: Scalar) -> Self {
        let mut out = [0u8; 4];
        for (out, (c0, c1)) in out.iter_mut().zip(self.0.into_iter().zip(other.0)) {
            *out = channel(c0 as Scalar * (1.0 - t) + c1 as Scalar * t);
        }
        Self(out)
    }

    /// Blend `other` on top of this color (source-over, straight alpha)
    pub fn blend_over(self, other: Self) -> Self {
        match other.alpha() {
            0 => return self,
            255 => return other,
            _ => {}
        }
        let sa = other.alpha() as Scalar / 255.0;
        let da = self.alpha() as Scalar / 255.0;
        let oa = sa + da * (1.0 - sa);
        let mix = |s: u8, d: u8| channel((s as Scalar * sa + d as Scalar * da * (1.0 - sa)) / oa);
        Self([
            mix(other.red(), self.red()),
            mix(other.green(), self.green()),
            mix(other.blue(), self.blue()),
            channel(oa * 255.0),
        ])
    }

    /// Parse exactly six hexadecimal digits `RRGGBB`
    fn from_hex(hex: &str) -> Option<Self> {
        let bytes = hex.as_bytes();
        if bytes.len() != 6 {
            return None;
        }
        let digit = |byte: u8| match byte {
            b'A'..=b'F' => Some(byte - b'A' + 10),
            b'a'..=b'f' => Some(byte - b'a' + 10),
            b'0'..=b'9' => Some(byte - b'0'),
            _ => None,
        };
        let mut rgb = [0u8; 3];
        for (value, pair) in rgb.iter_mut().zip(bytes.chunks(2)) {
            *value = digit(pair[0])? << 4 | digit(pair[1])?;
        }
        let [r, g, b] = rgb;
        Some(RGBA::new(r, g, b, 255))
    }

    /// Parse `R,G,B` triplet, each component is 1 to 3 decimal digits.
    /// Components above 255 are clamped.
    fn from_triplet(triplet: &str) -> Option<Self> {
        let mut rgb = [0u8; 3];
        let mut parts = triplet.split(',');
        for value in rgb.iter_mut() {
            let part = parts.next()?;
            if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            *value = part.parse::<u16>().ok()?.min(255) as u8;
        }
        if parts.next().is_some() {
            return None;
        }
        let [r, g, b] = rgb;
        Some(RGBA::new(r, g, b, 255))
    }
}

#[inline]
fn channel(value: Scalar) -> u8 {
    (value + 0.5).clamp(0.0, 255.0) as u8
}

impl fmt::Debug for RGBA {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [bg_r, bg_g, bg_b] = self.to_rgb();
        let [fg_r, fg_g, fg_b] = self.best_contrast(RGBA::WHITE, RGBA::BLACK).to_rgb();
        write!(
            fmt,
            "\x1b[38;2;{};{};{};48;2;{};{};{}m",
            fg_r, fg_g, fg_b, bg_r, bg_g, bg_b
        )?;
        write!(fmt, "{}", self)?;
        write!(fmt, "\x1b[m")
    }
}

impl fmt::Display for RGBA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)?;
        if a != 255 {
            write!(f, "{:02x}", a)?;
        }
        Ok(())
    }
}

/// Strict color token parser.
///
/// Accepts, in order of precedence: `RRGGBB` hex, `R,G,B` decimal triplet,
/// the literal `Transparent` and SVG color keywords (case-insensitive).
impl FromStr for RGBA {
    type Err = ColorError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if let Some(color) = RGBA::from_hex(token) {
            return Ok(color);
        }
        if let Some(color) = RGBA::from_triplet(token) {
            return Ok(color);
        }
        if token == "Transparent" {
            return Ok(RGBA::TRANSPARENT);
        }
        named_color(token).ok_or_else(|| ColorError::Unknown(token.to_owned()))
    }
}

fn named_color(name: &str) -> Option<RGBA> {
    static SVG_COLORS: OnceLock<HashMap<&'static str, RGBA>> = OnceLock::new();
    let colors = SVG_COLORS.get_or_init(|| {
        include_str!("svg-colors.txt")
            .lines()
            .filter_map(|line| {
                let (name, hex) = line.split_once(' ')?;
                Some((name, RGBA::from_hex(hex.trim().strip_prefix('#')?)?))
            })
            .collect()
    });
    colors.get(name.to_ascii_lowercase().as_str()).copied()
}

/// Lenient color resolution used by render pipelines.
///
/// Unknown tokens never fail, they are replaced by a random opaque color
/// drawn from the injected random source.
pub struct ColorResolver<'a> {
    rng: &'a mut dyn RngCore,
}

impl<'a> ColorResolver<'a> {
    pub fn new(rng: &'a mut dyn RngCore) -> Self {
        Self { rng }
    }

    /// Uniformly random opaque color
    pub fn random(&mut self) -> RGBA {
        RGBA::new(
            self.rng.gen_range(0..=255),
            self.rng.gen_range(0..=255),
            self.rng.gen_range(0..=255),
            255,
        )
    }

    pub fn resolve(&mut self, token: &str) -> RGBA {
        match token.parse() {
            Ok(color) => color,
            Err(error) => {
                let color = self.random();
                tracing::debug!("[color] {}, substituting {}", error, color);
                color
            }
        }
    }

    /// Resolve whitespace separated tokens, never returns an empty list
    pub fn resolve_many(&mut self, tokens: &str) -> Vec<RGBA> {
        let mut colors: Vec<_> = tokens
            .split_whitespace()
            .map(|token| self.resolve(token))
            .collect();
        if colors.is_empty() {
            colors.push(self.random());
        }
        colors
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    Unknown(String),
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::Unknown(token) => write!(
                f,
                "unknown color {:?}, expected RRGGBB, R,G,B, Transparent or a color name",
                token
            ),
        }
    }
}

impl std::error::Error for ColorError {}
