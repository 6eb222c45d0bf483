//! Command line front end, renders gradient text, gradient images and colorized images
use fancytext::*;
use std::env;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

type Error = Box<dyn std::error::Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    /// Flag without value
    None,
    /// Exactly one following argument
    Single,
    /// All following arguments up to the next flag, joined with spaces
    Multi,
}

/// Command line flag, option key, arity and help
#[rustfmt::skip]
const FLAGS: &[(&str, &str, Arity, &str)] = &[
    ("-tsi", "textSize", Arity::Single, "TEXT (integer) size of the text"),
    ("-tf", "textFont", Arity::Multi, "TEXT (string) font family of the text"),
    ("-tst", "textStyle", Arity::Single, "TEXT (b/bold, i/italic, u/underline) font style"),
    ("-ta", "textAlignment", Arity::Single, "TEXT (n/l/near/left, f/r/far/right) alignment"),
    ("-fil", "frontImageLink", Arity::Multi, "TEXT/IMAGE/COLOR (image file) used instead of front colors"),
    ("-finr", "frontImageNoResize", Arity::None, "TEXT stretch front image over the canvas instead of the text"),
    ("-fcol", "frontColors", Arity::Multi, "TEXT/IMAGE/COLOR (hex/R,G,B/name ...) front gradient colors"),
    ("-fgm", "frontGradientMode", Arity::Single, "TEXT/IMAGE/COLOR (v/vertical, b/backward, f/forward) front gradient direction"),
    ("-bil", "backImageLink", Arity::Multi, "TEXT (image file) drawn over background colors"),
    ("-bsm", "backScaleMode", Arity::Single, "TEXT (h/height, w/width, b/both) background image scaling"),
    ("-bsw", "backScaleW", Arity::Single, "TEXT (integer) background image width scale in percent"),
    ("-bsh", "backScaleH", Arity::Single, "TEXT (integer) background image height scale in percent"),
    ("-bow", "backOffsetW", Arity::Single, "TEXT (integer) background image width offset in percent"),
    ("-boh", "backOffsetH", Arity::Single, "TEXT (integer) background image height offset in percent"),
    ("-bcol", "backColors", Arity::Multi, "TEXT (hex/R,G,B/name ...) background gradient colors"),
    ("-bgm", "backGradientMode", Arity::Single, "TEXT (v/vertical, b/backward, f/forward) background gradient direction"),
    ("-cit", "colorIntensity", Arity::Single, "COLOR (integer) blending intensity in percent"),
    ("-gr", "grayscaleRate", Arity::Single, "IMAGE (integer) grayscale threshold in percent"),
    ("-igs", "invertGrayscale", Arity::None, "IMAGE cut out black instead of white"),
    ("-pw", "paddingW", Arity::Single, "TEXT (integer) horizontal padding"),
    ("-ph", "paddingH", Arity::Single, "TEXT (integer) vertical padding"),
    ("-w", "width", Arity::Single, "TEXT (integer) width instead of measured text width"),
    ("-h", "height", Arity::Single, "TEXT (integer) height instead of measured text height"),
    ("-sdir", "fileLocation", Arity::Multi, "ALL (directory) output directory"),
    ("-snm", "fileName", Arity::Multi, "ALL (string) output file name without extension"),
];

fn usage(cmd: &str) {
    eprintln!("Renders gradient text, gradient images and colorized images");
    eprintln!("\nUSAGE:");
    eprintln!("    {} <text|image|color> [direct param...] [-flag value...]", cmd);
    eprintln!("    {} fontlist", cmd);
    eprintln!("    {} help", cmd);
    eprintln!("\nEXAMPLE:");
    eprintln!(
        "    {} text Hello World -tf Comic Sans MS -fcol Red 0,255,0 0000FF -tst b -snm test",
        cmd
    );
    eprintln!("\nDIRECT PARAM:");
    eprintln!("    text               text to render");
    eprintln!("    image              image providing the silhouette");
    eprintln!("    color              image to colorize");
    eprintln!("\nARGS:");
    eprintln!("    -json <file>       read options from a JSON object of strings");
    for (flag, key, _, help) in FLAGS {
        eprintln!("    {:<6} {:<18} {}", flag, key, help);
    }
}

/// Collect arguments following the mode into render options
fn parse_options(args: &[String]) -> Result<RenderOptions, Error> {
    let mut options = RenderOptions::new();
    let mut index = 0;
    let take_multi = |index: &mut usize| {
        let start = *index;
        while *index < args.len() && !args[*index].starts_with('-') {
            *index += 1;
        }
        args[start..*index].join(" ")
    };

    let direct = take_multi(&mut index);
    if !direct.is_empty() {
        options.insert("inputText", direct);
    }
    while index < args.len() {
        let flag = args[index].to_ascii_lowercase();
        index += 1;
        if flag == "-json" {
            let path = args.get(index).ok_or("-json requires file argument")?;
            index += 1;
            let json = std::fs::read_to_string(path)?;
            options.extend(RenderOptions::from_json(&json)?);
            continue;
        }
        let Some((_, key, arity, _)) = FLAGS.iter().find(|(name, ..)| *name == flag) else {
            tracing::warn!("[args] unknown flag {}", flag);
            take_multi(&mut index);
            continue;
        };
        let value = match arity {
            Arity::None => String::from("true"),
            Arity::Single => {
                let value = args
                    .get(index)
                    .ok_or_else(|| format!("{} requires argument", flag))?;
                index += 1;
                value.clone()
            }
            Arity::Multi => take_multi(&mut index),
        };
        if !value.is_empty() {
            options.insert(*key, value);
        }
    }
    Ok(options)
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let cmd = args.first().map(String::as_str).unwrap_or("fancytext");
    let Some(mode) = args.get(1) else {
        usage(cmd);
        std::process::exit(1);
    };
    let kind = match mode.as_str() {
        "help" => {
            usage(cmd);
            return Ok(());
        }
        "fontlist" => {
            for family in SystemFonts::new().families() {
                println!("{}", family);
            }
            return Ok(());
        }
        mode => match mode.parse::<PipelineKind>() {
            Ok(kind) => kind,
            Err(error) => {
                eprintln!("{}, see \"{} help\"", error, cmd);
                std::process::exit(1);
            }
        },
    };

    let options = parse_options(&args[2..])?;
    for (key, value) in options.iter() {
        tracing::debug!("[args] {}: {}", key, value);
    }

    let mut rng = rand::thread_rng();
    let request = RenderRequest::from_options(kind, &options, &mut rng);
    let fonts = match kind {
        PipelineKind::GradientText => SystemFonts::new(),
        _ => SystemFonts::empty(),
    };
    let path = request.run(&fonts, &FileStorage::default())?;
    println!("File saved as {}", path.display());
    Ok(())
}
