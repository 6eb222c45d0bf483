mod common;

use common::{BlockFonts, FAMILY, scratch_dir, write_image};
use fancytext::{
    FileStorage, Image, PipelineKind, PixelBuffer, RGBA, RenderError, RenderOptions,
    RenderRequest, Size,
};
use rand::{SeedableRng, rngs::StdRng};

type Error = Box<dyn std::error::Error>;

const RED: RGBA = RGBA::new(255, 0, 0, 255);
const BLUE: RGBA = RGBA::new(0, 0, 255, 255);

fn render(kind: PipelineKind, options: &RenderOptions) -> Result<PixelBuffer, RenderError> {
    let mut rng = StdRng::seed_from_u64(42);
    let request = RenderRequest::from_options(kind, options, &mut rng);
    Ok(request.render(&BlockFonts)?.image)
}

fn text_options(text: &str) -> RenderOptions {
    RenderOptions::new()
        .with("inputText", text)
        .with("textFont", FAMILY)
        .with("textSize", "8")
        .with("frontColors", "Red")
        .with("backColors", "Blue")
}

fn solid(size: Size, color: RGBA) -> PixelBuffer {
    PixelBuffer::new_with(size, |_, _| color)
}

#[test]
fn text_canvas_is_measured_size_plus_padding() -> Result<(), Error> {
    let options = text_options("Hi")
        .with("paddingW", "3")
        .with("paddingH", "2")
        .with("width", "-1")
        .with("height", "-1");
    let image = render(PipelineKind::GradientText, &options)?;
    assert_eq!(image.size(), Size::new(14, 12));
    assert_eq!(image.get(0, 0), Some(&BLUE));
    assert_eq!(image.get(4, 5), Some(&RED));
    assert_eq!(image.get(9, 5), Some(&BLUE));

    let image = render(
        PipelineKind::GradientText,
        &text_options("Hi\nthere").with("paddingW", "1"),
    )?;
    // widest line is 5 glyphs of 4 pixels, two lines of 8 pixels
    assert_eq!(image.size(), Size::new(22, 16));
    Ok(())
}

#[test]
fn text_size_overrides() -> Result<(), Error> {
    let options = text_options("Hi")
        .with("width", "20")
        .with("height", "10")
        .with("paddingW", "1")
        .with("paddingH", "1");
    let image = render(PipelineKind::GradientText, &options)?;
    assert_eq!(image.size(), Size::new(22, 12));
    Ok(())
}

#[test]
fn text_alignment_near_and_far() -> Result<(), Error> {
    let options = text_options("Hi").with("width", "16").with("height", "8");
    let near = render(PipelineKind::GradientText, &options.clone().with("textAlignment", "l"))?;
    assert_eq!(near.get(3, 0), Some(&RED));
    assert_eq!(near.get(3, 15), Some(&BLUE));

    let far = render(PipelineKind::GradientText, &options.with("textAlignment", "far"))?;
    assert_eq!(far.get(3, 0), Some(&BLUE));
    assert_eq!(far.get(3, 15), Some(&RED));
    Ok(())
}

#[test]
fn render_is_idempotent() -> Result<(), Error> {
    let options = text_options("Same\ntwice")
        .with("frontColors", "Red Lime 0,0,255")
        .with("frontGradientMode", "f")
        .with("backColors", "FFFF00 Transparent")
        .with("backGradientMode", "v")
        .with("paddingW", "5");
    let first = render(PipelineKind::GradientText, &options)?;
    let second = render(PipelineKind::GradientText, &options)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn text_background_image_placement() -> Result<(), Error> {
    let dir = scratch_dir("back-image");
    let green = RGBA::new(0, 128, 0, 255);
    let back = write_image(&dir, "back.png", &solid(Size::new(2, 2), green));
    let options = text_options("Hi")
        .with("frontColors", "Transparent")
        .with("paddingW", "3")
        .with("paddingH", "2")
        .with("backImageLink", back.as_str());

    // centred by default
    let image = render(PipelineKind::GradientText, &options)?;
    assert_eq!(image.get(5, 6), Some(&green));
    assert_eq!(image.get(6, 7), Some(&green));
    assert_eq!(image.get(4, 6), Some(&BLUE));

    // height offset moves the image horizontally
    let image = render(
        PipelineKind::GradientText,
        &options.clone().with("backOffsetH", "0"),
    )?;
    assert_eq!(image.get(5, 0), Some(&green));
    assert_eq!(image.get(5, 6), Some(&BLUE));

    // stretched over the whole canvas
    let image = render(PipelineKind::GradientText, &options.with("backScaleMode", "b"))?;
    assert!(image.iter().all(|c| *c == green));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn text_front_image_texture() -> Result<(), Error> {
    let dir = scratch_dir("front-image");
    let yellow = RGBA::new(255, 255, 0, 255);
    let front = write_image(&dir, "front.png", &solid(Size::new(1, 1), yellow));
    let options = text_options("Hi").with("paddingW", "3").with("paddingH", "2");

    let image = render(
        PipelineKind::GradientText,
        &options.clone().with("frontImageLink", front.as_str()),
    )?;
    assert_eq!(image.get(4, 5), Some(&yellow));
    assert_eq!(image.get(0, 0), Some(&BLUE));

    // missing texture falls back to the gradient
    let missing = dir.join("missing.png");
    let image = render(
        PipelineKind::GradientText,
        &options.with("frontImageLink", missing.to_string_lossy()),
    )?;
    assert_eq!(image.get(4, 5), Some(&RED));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn text_font_not_found_writes_nothing() {
    let dir = scratch_dir("no-font");
    let options = text_options("Hi")
        .with("textFont", "Definitely Not Installed")
        .with("fileLocation", dir.to_string_lossy())
        .with("fileName", "out");
    let mut rng = StdRng::seed_from_u64(1);
    let request = RenderRequest::from_options(PipelineKind::GradientText, &options, &mut rng);
    let result = request.run(&BlockFonts, &FileStorage::new(&dir));
    assert!(matches!(result, Err(RenderError::FontNotFound { .. })));
    assert!(!dir.join("out.png").exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn empty_text_renders_but_can_not_be_saved() -> Result<(), Error> {
    let dir = scratch_dir("empty-text");
    let options = text_options("")
        .with("fileLocation", dir.to_string_lossy())
        .with("fileName", "empty");
    let image = render(PipelineKind::GradientText, &options)?;
    assert_eq!(image.size(), Size::new(0, 0));

    let mut rng = StdRng::seed_from_u64(1);
    let request = RenderRequest::from_options(PipelineKind::GradientText, &options, &mut rng);
    let result = request.run(&BlockFonts, &FileStorage::new(&dir));
    assert!(matches!(result, Err(RenderError::Persistence { .. })));

    // padding only image
    let padded = options.with("paddingW", "2").with("paddingH", "1");
    let image = render(PipelineKind::GradientText, &padded)?;
    assert_eq!(image.size(), Size::new(4, 2));
    assert!(image.iter().all(|c| *c == BLUE));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn text_run_saves_png() -> Result<(), Error> {
    let dir = scratch_dir("run");
    let options = text_options("Hi")
        .with("fileLocation", dir.to_string_lossy())
        .with("fileName", "hello");
    let mut rng = StdRng::seed_from_u64(1);
    let request = RenderRequest::from_options(PipelineKind::GradientText, &options, &mut rng);
    let path = request.run(&BlockFonts, &FileStorage::new(dir.join("default")))?;
    assert_eq!(path, dir.join("hello.png"));
    let decoded = PixelBuffer::open(&path)?;
    assert_eq!(decoded, request.render(&BlockFonts)?.image);

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

fn silhouette() -> PixelBuffer {
    PixelBuffer::new_with(Size::new(2, 1), |_, col| {
        if col == 0 { RGBA::WHITE } else { RGBA::BLACK }
    })
}

#[test]
fn gradient_image_cutout() -> Result<(), Error> {
    let dir = scratch_dir("cutout");
    let mask = write_image(&dir, "mask.png", &silhouette());
    let options = RenderOptions::new()
        .with("inputText", mask.as_str())
        .with("frontColors", "Red");

    let image = render(PipelineKind::GradientImage, &options)?;
    assert_eq!(image.to_vec(), vec![RGBA::TRANSPARENT, RED]);

    let image = render(
        PipelineKind::GradientImage,
        &options.clone().with("invertGrayscale", ""),
    )?;
    assert_eq!(image.to_vec(), vec![RED, RGBA::TRANSPARENT]);

    // fill image replaces the gradient
    let fill = write_image(&dir, "fill.png", &solid(Size::new(1, 1), BLUE));
    let image = render(
        PipelineKind::GradientImage,
        &options.with("frontImageLink", fill.as_str()),
    )?;
    assert_eq!(image.to_vec(), vec![RGBA::TRANSPARENT, BLUE]);

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn gradient_image_requires_mask() -> Result<(), Error> {
    let dir = scratch_dir("no-mask");
    let missing = dir.join("missing.png");
    let options = RenderOptions::new().with("inputText", missing.to_string_lossy());
    assert!(matches!(
        render(PipelineKind::GradientImage, &options),
        Err(RenderError::AssetNotFound(_))
    ));

    let broken = dir.join("broken.png");
    std::fs::write(&broken, b"definitely not a png")?;
    let options = RenderOptions::new().with("inputText", broken.to_string_lossy());
    assert!(matches!(
        render(PipelineKind::GradientImage, &options),
        Err(RenderError::AssetLoad { .. })
    ));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn colorize_translucent_gradient() -> Result<(), Error> {
    let dir = scratch_dir("colorize");
    let base = write_image(&dir, "base.png", &solid(Size::new(2, 2), RGBA::WHITE));
    let options = RenderOptions::new()
        .with("inputText", base.as_str())
        .with("frontColors", "Black")
        .with("colorIntensity", "50");
    let image = render(PipelineKind::Colorize, &options)?;
    assert_eq!(image.size(), Size::new(2, 2));
    assert!(image.iter().all(|c| *c == RGBA::new(128, 128, 128, 255)));

    let image = render(
        PipelineKind::Colorize,
        &options.clone().with("colorIntensity", "0"),
    )?;
    assert!(image.iter().all(|c| *c == RGBA::WHITE));

    // blend image uses intensity as opacity
    let blend = write_image(&dir, "blend.png", &solid(Size::new(1, 1), RGBA::BLACK));
    let image = render(
        PipelineKind::Colorize,
        &options.with("frontImageLink", blend.as_str()),
    )?;
    assert!(image.iter().all(|c| *c == RGBA::new(127, 127, 127, 255)));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn colorize_missing_blend_falls_back_to_gradient() -> Result<(), Error> {
    let dir = scratch_dir("colorize-missing");
    let base = write_image(&dir, "base.png", &solid(Size::new(3, 2), RGBA::WHITE));
    let missing = dir.join("missing.png");
    let options = RenderOptions::new()
        .with("inputText", base.as_str())
        .with("frontImageLink", missing.to_string_lossy())
        .with("frontColors", "Black")
        .with("colorIntensity", "50");
    let image = render(PipelineKind::Colorize, &options)?;
    assert_eq!(image.size(), Size::new(3, 2));
    assert!(image.iter().all(|c| *c == RGBA::new(128, 128, 128, 255)));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn malformed_optional_asset_aborts() -> Result<(), Error> {
    let dir = scratch_dir("broken-optional");
    let broken = dir.join("broken.png");
    std::fs::write(&broken, b"\x89PNG but not really")?;
    let broken = broken.to_string_lossy();

    for key in ["backImageLink", "frontImageLink"] {
        let options = text_options("Hi").with(key, &*broken);
        assert!(
            matches!(
                render(PipelineKind::GradientText, &options),
                Err(RenderError::AssetLoad { .. })
            ),
            "{}",
            key
        );
    }

    let base = write_image(&dir, "base.png", &solid(Size::new(2, 2), RGBA::WHITE));
    for kind in [PipelineKind::Colorize, PipelineKind::GradientImage] {
        let options = RenderOptions::new()
            .with("inputText", base.as_str())
            .with("frontImageLink", &*broken);
        assert!(
            matches!(render(kind, &options), Err(RenderError::AssetLoad { .. })),
            "{}",
            kind
        );
    }

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}
