//! Render pipelines, one per output kind
//!
//! Each pipeline reads its own subset of [`RenderOptions`] into a typed
//! options struct, renders a [`PixelBuffer`] and hands it together with the
//! suggested [`OutputTarget`] to a [`Storage`].
use crate::{
    ColorResolver, Compositor, FontSource, GradLinear, GradStops, GradientDirection, Image,
    OptionError, OutputTarget, PixelBuffer, Placement, RGBA, Rect, RenderOptions, Result, Scalar,
    ScalingMode, Size, Storage, TextAlignment, TextShaper, TextStyle, cutout_mask,
    default_directory, luma_threshold,
};
use rand::{Rng, RngCore};
use std::{fmt, path::PathBuf, str::FromStr};

/// Upper bound (exclusive) of generated file names
const FILE_NAME_RANGE: u32 = 99_999_999;

/// First of the alias keys present in options, or the preferred one
fn key<'a>(options: &RenderOptions, keys: &[&'a str]) -> &'a str {
    keys.iter()
        .copied()
        .find(|key| options.contains(key))
        .unwrap_or(keys[0])
}

fn percent(value: i64) -> Scalar {
    value as Scalar / 100.0
}

/// Gradient mask shaped by the silhouette of a grayscale image
#[derive(Debug, Clone, PartialEq)]
pub struct GradientImageOptions {
    /// Image providing the silhouette and the canvas size
    pub mask_image: String,
    /// Image used instead of the gradient when present
    pub fill_image: String,
    pub colors: Vec<RGBA>,
    pub direction: GradientDirection,
    /// Grayscale threshold in percent
    pub grayscale_rate: i64,
    /// Cut out black instead of white
    pub invert: bool,
}

impl Default for GradientImageOptions {
    fn default() -> Self {
        Self {
            mask_image: String::new(),
            fill_image: String::new(),
            colors: vec![RGBA::WHITE],
            direction: GradientDirection::Horizontal,
            grayscale_rate: 50,
            invert: false,
        }
    }
}

impl GradientImageOptions {
    pub fn from_options(options: &RenderOptions, rng: &mut dyn RngCore) -> Self {
        let default = Self::default();
        let mut resolver = ColorResolver::new(rng);
        Self {
            mask_image: options.text("inputText", &default.mask_image),
            fill_image: options.string("frontImageLink", &default.fill_image),
            colors: options.colors("frontColors", &default.colors, &mut resolver),
            direction: options.parsed("frontGradientMode", default.direction),
            grayscale_rate: options.int("grayscaleRate", default.grayscale_rate, 0, 100),
            invert: options.flag("invertGrayscale", default.invert),
        }
    }

    pub fn render(&self) -> Result<PixelBuffer> {
        let base = PixelBuffer::open(&self.mask_image)?;
        let fill = PixelBuffer::open_optional(&self.fill_image)?;
        let mask = tracing::debug_span!("[cutout]", invert = self.invert).in_scope(|| {
            let gray = luma_threshold(&base, percent(self.grayscale_rate));
            cutout_mask(&gray, self.invert)
        });

        let mut comp = Compositor::new(base.size());
        let bounds = comp.bounds();
        tracing::debug_span!("[background]").in_scope(|| match fill {
            Some(image) => comp.draw_image(&image, bounds, 1.0),
            None => comp.fill(bounds, &GradLinear::fit(&self.colors[..], bounds, self.direction)),
        });
        comp.cut_out(&mask);
        Ok(comp.finish())
    }
}

/// Image tinted with a translucent gradient or another image
#[derive(Debug, Clone, PartialEq)]
pub struct ColorizeOptions {
    pub base_image: String,
    /// Image blended over the base instead of the gradient when present
    pub blend_image: String,
    pub colors: Vec<RGBA>,
    pub direction: GradientDirection,
    /// Opacity of the overlay in percent
    pub intensity: i64,
}

impl Default for ColorizeOptions {
    fn default() -> Self {
        Self {
            base_image: String::new(),
            blend_image: String::new(),
            colors: vec![RGBA::WHITE],
            direction: GradientDirection::Horizontal,
            intensity: 50,
        }
    }
}

impl ColorizeOptions {
    pub fn from_options(options: &RenderOptions, rng: &mut dyn RngCore) -> Self {
        let default = Self::default();
        let mut resolver = ColorResolver::new(rng);
        Self {
            base_image: options.text("inputText", &default.base_image),
            blend_image: options.string("frontImageLink", &default.blend_image),
            colors: options.colors("frontColors", &default.colors, &mut resolver),
            direction: options.parsed(
                key(options, &["frontGradientMode", "frontGradMode"]),
                default.direction,
            ),
            intensity: options.int("colorIntensity", default.intensity, 0, 100),
        }
    }

    pub fn render(&self) -> Result<PixelBuffer> {
        let base = PixelBuffer::open(&self.base_image)?;
        let blend = PixelBuffer::open_optional(&self.blend_image)?;
        let bounds = Rect::from_size(base.size());
        let mut comp = Compositor::from_image(base);
        tracing::debug_span!("[background]", intensity = self.intensity).in_scope(|| match blend {
            Some(image) => comp.draw_image(&image, bounds, percent(self.intensity)),
            None => {
                let alpha = (255 * self.intensity / 100) as u8;
                let stops = GradStops::evenly_spaced(&self.colors).with_alpha(alpha);
                comp.fill(bounds, &GradLinear::fit(stops, bounds, self.direction));
            }
        });
        Ok(comp.finish())
    }
}

/// Text filled with a gradient or an image over a gradient or image background
#[derive(Debug, Clone, PartialEq)]
pub struct GradientTextOptions {
    pub text: String,
    pub font: String,
    pub size: i64,
    pub style: TextStyle,
    pub alignment: TextAlignment,

    pub front_colors: Vec<RGBA>,
    pub front_image: String,
    /// Stretch front image over the whole canvas instead of the text rectangle
    pub front_image_no_resize: bool,
    pub front_direction: GradientDirection,

    pub back_image: String,
    pub back_scale_mode: ScalingMode,
    /// Back image `[width, height]` scale in percent
    pub back_scale: [i64; 2],
    /// Back image `[width, height]` offset in percent
    pub back_offset: [i64; 2],
    pub back_colors: Vec<RGBA>,
    pub back_direction: GradientDirection,

    pub padding: Size,
    /// Overrides of the measured text size
    pub width: Option<usize>,
    pub height: Option<usize>,
}

impl Default for GradientTextOptions {
    fn default() -> Self {
        Self {
            text: String::from("Placeholder Text"),
            font: String::from("Arial"),
            size: 160,
            style: TextStyle::Regular,
            alignment: TextAlignment::Center,
            front_colors: vec![RGBA::WHITE],
            front_image: String::new(),
            front_image_no_resize: false,
            front_direction: GradientDirection::Horizontal,
            back_image: String::new(),
            back_scale_mode: ScalingMode::None,
            back_scale: [100, 100],
            back_offset: [50, 50],
            back_colors: vec![RGBA::TRANSPARENT],
            back_direction: GradientDirection::Horizontal,
            padding: Size::new(0, 0),
            width: None,
            height: None,
        }
    }
}

impl GradientTextOptions {
    pub fn from_options(options: &RenderOptions, rng: &mut dyn RngCore) -> Self {
        let default = Self::default();
        let mut resolver = ColorResolver::new(rng);
        // only an exact -1 derives the dimension from the measured text
        let dimension = |name: &str| match options.get(name).map(str::trim) {
            None | Some("-1") => None,
            Some(_) => match options.int(name, -1, 1, 4096) {
                -1 => None,
                value => Some(value as usize),
            },
        };
        Self {
            text: options.text("inputText", &default.text),
            font: options.string("textFont", &default.font),
            size: options.int("textSize", default.size, 1, 320),
            style: options.parsed("textStyle", default.style),
            alignment: options.parsed("textAlignment", default.alignment),

            front_colors: options.colors("frontColors", &default.front_colors, &mut resolver),
            front_image: options.string("frontImageLink", &default.front_image),
            front_image_no_resize: options
                .flag("frontImageNoResize", default.front_image_no_resize),
            front_direction: options.parsed(
                key(options, &["frontGradientMode", "textGradientMode"]),
                default.front_direction,
            ),

            back_image: options.string("backImageLink", &default.back_image),
            back_scale_mode: options.parsed("backScaleMode", default.back_scale_mode),
            back_scale: [
                options.int("backScaleW", default.back_scale[0], 1, 400),
                options.int("backScaleH", default.back_scale[1], 1, 400),
            ],
            back_offset: [
                options.int("backOffsetW", default.back_offset[0], 0, 100),
                options.int("backOffsetH", default.back_offset[1], 0, 100),
            ],
            back_colors: options.colors("backColors", &default.back_colors, &mut resolver),
            back_direction: options.parsed(
                key(options, &["backGradientMode", "backGradMode"]),
                default.back_direction,
            ),

            padding: Size::new(
                options.int("paddingW", 0, 0, 1024) as usize,
                options.int("paddingH", 0, 0, 1024) as usize,
            ),
            width: dimension("width"),
            height: dimension("height"),
        }
    }

    /// Placement of the back image.
    ///
    /// Height offset moves the image horizontally and width offset
    /// vertically, existing renders depend on it.
    pub fn back_placement(&self) -> Placement {
        let [scale_w, scale_h] = self.back_scale;
        let [offset_w, offset_h] = self.back_offset;
        Placement {
            mode: self.back_scale_mode,
            scale: [percent(scale_w), percent(scale_h)],
            offset: [percent(offset_h), percent(offset_w)],
        }
    }

    pub fn render(&self, fonts: &dyn FontSource) -> Result<PixelBuffer> {
        let shaper = TextShaper::new(fonts, &self.font, self.size as Scalar, self.style)?;
        let back_image = PixelBuffer::open_optional(&self.back_image)?;
        let front_image = PixelBuffer::open_optional(&self.front_image)?;

        let measured = shaper.measure(&self.text);
        let content = Size::new(
            self.width.unwrap_or(measured.width),
            self.height.unwrap_or(measured.height),
        );
        let canvas = content.padded(self.padding);
        tracing::debug!("[text] measured {} canvas {}", measured, canvas);

        let mut comp = Compositor::new(canvas);
        let bounds = comp.bounds();
        tracing::debug_span!("[background]").in_scope(|| {
            let grad = GradLinear::fit(&self.back_colors[..], bounds, self.back_direction);
            comp.fill(bounds, &grad);
            if let Some(image) = back_image {
                let dest = self.back_placement().place(image.size(), bounds);
                comp.draw_image(&image, dest, 1.0);
            }
        });

        tracing::debug_span!("[text]", style = %self.style).in_scope(|| {
            let mask = shaper.rasterize(&self.text, self.alignment, canvas, self.padding);
            match front_image {
                Some(image) => {
                    let dest = if self.front_image_no_resize {
                        bounds
                    } else {
                        Rect::new(
                            self.padding.width as i64,
                            self.padding.height as i64,
                            measured.width,
                            measured.height,
                        )
                    };
                    let mut layer = Compositor::new(canvas);
                    layer.draw_image(&image, dest, 1.0);
                    comp.fill_masked(&mask, &layer.finish());
                }
                None => {
                    let grad =
                        GradLinear::fit(&self.front_colors[..], bounds, self.front_direction);
                    comp.fill_masked(&mask, &grad);
                }
            }
        });
        Ok(comp.finish())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PipelineKind {
    GradientImage,
    Colorize,
    GradientText,
}

impl FromStr for PipelineKind {
    type Err = OptionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "image" => Ok(Self::GradientImage),
            "color" => Ok(Self::Colorize),
            "text" => Ok(Self::GradientText),
            _ => Err(OptionError::new(value, "text, image or color")),
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Pipeline variant together with its options
#[derive(Debug, Clone, PartialEq)]
pub enum Pipeline {
    GradientImage(GradientImageOptions),
    Colorize(ColorizeOptions),
    GradientText(GradientTextOptions),
}

impl Pipeline {
    pub fn from_options(
        kind: PipelineKind,
        options: &RenderOptions,
        rng: &mut dyn RngCore,
    ) -> Self {
        match kind {
            PipelineKind::GradientImage => {
                Pipeline::GradientImage(GradientImageOptions::from_options(options, rng))
            }
            PipelineKind::Colorize => {
                Pipeline::Colorize(ColorizeOptions::from_options(options, rng))
            }
            PipelineKind::GradientText => {
                Pipeline::GradientText(GradientTextOptions::from_options(options, rng))
            }
        }
    }

    pub fn kind(&self) -> PipelineKind {
        match self {
            Pipeline::GradientImage(_) => PipelineKind::GradientImage,
            Pipeline::Colorize(_) => PipelineKind::Colorize,
            Pipeline::GradientText(_) => PipelineKind::GradientText,
        }
    }

    /// Render image, fonts are only used by the text pipeline
    pub fn render(&self, fonts: &dyn FontSource) -> Result<PixelBuffer> {
        match self {
            Pipeline::GradientImage(options) => options.render(),
            Pipeline::Colorize(options) => options.render(),
            Pipeline::GradientText(options) => options.render(fonts),
        }
    }
}

/// Rendered image and where it should be stored
#[derive(Debug, Clone)]
pub struct Rendered {
    pub image: PixelBuffer,
    pub target: OutputTarget,
}

/// Everything needed to produce one output file
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub pipeline: Pipeline,
    pub target: OutputTarget,
}

impl RenderRequest {
    pub fn new(pipeline: Pipeline, target: OutputTarget) -> Self {
        Self { pipeline, target }
    }

    /// Read pipeline options and output location.
    ///
    /// `fileLocation` defaults to [`default_directory`] and `fileName` to a
    /// random number drawn from `rng`.
    pub fn from_options(
        kind: PipelineKind,
        options: &RenderOptions,
        rng: &mut dyn RngCore,
    ) -> Self {
        tracing::debug_span!("[options]", %kind).in_scope(|| {
            let pipeline = Pipeline::from_options(kind, options, rng);
            let directory = match options.get("fileLocation") {
                Some(location) => PathBuf::from(location),
                None => default_directory(),
            };
            let file_stem = match options.get("fileName") {
                Some(name) => name.to_owned(),
                None => rng.gen_range(0..FILE_NAME_RANGE).to_string(),
            };
            tracing::debug!("[options] {:?}", pipeline);
            Self::new(pipeline, OutputTarget::new(directory, file_stem))
        })
    }

    pub fn render(&self, fonts: &dyn FontSource) -> Result<Rendered> {
        let image = self.pipeline.render(fonts)?;
        Ok(Rendered {
            image,
            target: self.target.clone(),
        })
    }

    /// Render and save, nothing is written if rendering fails
    pub fn run(&self, fonts: &dyn FontSource, storage: &dyn Storage) -> Result<PathBuf> {
        let rendered = self.render(fonts)?;
        tracing::debug_span!("[save]").in_scope(|| storage.save(&rendered.image, &rendered.target))
    }
}
