//! ansiplay - render or replay ANSI art
//!
//! # Quick Start
//!
//! ```text
//! ansiplay art.ans                  # Write art.png
//! ansiplay --thumbnail 2 art.ans    # Quarter-size preview
//! ansiplay --animate --baud 14400 art.ans   # Paced replay as art.gif
//! ansiplay --sauce art.ans          # Show the metadata record
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ansiplay::render::font::BitmapFont;
use ansiplay::{AppConfig, GifRecorder, Playback, RenderConfig, RenderOptions, Sauce};

/// Environment variable holding the log filter
const LOG_ENV: &str = "ANSIPLAY_LOG";
/// Upper bound on recorded frames (five minutes of blink periods)
const MAX_FRAMES: usize = 1200;

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command line configuration
#[derive(Default)]
struct Args {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    options: RenderOptions,
    baud: Option<u32>,
    animate: bool,
    sauce: bool,
    verbose: bool,
}

fn print_version() {
    eprintln!("ansiplay {}", VERSION);
}

fn print_help() {
    eprintln!("ansiplay {} - ANSI art renderer and baud-paced player", VERSION);
    eprintln!();
    eprintln!("Usage: ansiplay [OPTIONS] <FILE>");
    eprintln!();
    eprintln!("Output options:");
    eprintln!("  -o, --output <PATH>   Output file (default: input with .png/.gif/.rgba)");
    eprintln!("  --imagedata           Write the raw RGBA buffer instead of a PNG");
    eprintln!("  --animate             Write an animated GIF of the paced replay");
    eprintln!("  --baud <N>            Replay rate in bits per second (default: 115200)");
    eprintln!("  --sauce               Print the SAUCE record and exit");
    eprintln!();
    eprintln!("Render options:");
    eprintln!("  --icecolors           Blink becomes bright background");
    eprintln!("  --bits <B>            8, 9, ced or workbench");
    eprintln!("  --columns <N>         Override the column count");
    eprintln!("  --rows <N>            Surface height in rows (default: 26)");
    eprintln!("  --font <NAME>         {}", BitmapFont::presets().join(" or "));
    eprintln!("  --thumbnail <N>       Downsample level 0-3");
    eprintln!("  --2x                  Mark output as double density");
    eprintln!("  --no-2j               Ignore the clear-screen escape");
    eprintln!("  --mode <M>            Editor mode hint (ced implies 78 columns)");
    eprintln!();
    eprintln!("Other options:");
    eprintln!("  -v, --verbose         Debug logging");
    eprintln!("  -V, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Configuration: ~/.ansiplay/config.toml");
    eprintln!("Log filter: {} (e.g. {}=trace)", LOG_ENV, LOG_ENV);
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();
    let mut config = Args::default();
    let mut i = 1;

    // Value of the flag at args[i]
    fn value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
        *i += 1;
        args.get(*i)
            .map(String::as_str)
            .ok_or_else(|| format!("Missing argument for {}", flag))
    }

    fn number(text: &str, flag: &str) -> Result<i64, String> {
        text.parse()
            .map_err(|_| format!("Invalid number for {}: {}", flag, text))
    }

    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-v" | "--verbose" => config.verbose = true,
            "-o" | "--output" => {
                config.output = Some(PathBuf::from(value(&args, &mut i, arg)?));
            }
            "--imagedata" => config.options.imagedata = Some(1),
            "--animate" => config.animate = true,
            "--baud" => {
                let text = value(&args, &mut i, arg)?;
                let baud = text
                    .parse()
                    .map_err(|_| format!("Invalid baud rate: {}", text))?;
                config.baud = Some(baud);
            }
            "--sauce" => config.sauce = true,
            // Render options
            "--icecolors" => config.options.icecolors = Some(1),
            "--bits" => config.options.bits = Some(value(&args, &mut i, arg)?.to_string()),
            "--columns" => config.options.columns = Some(number(value(&args, &mut i, arg)?, arg)?),
            "--rows" => config.options.rows = Some(number(value(&args, &mut i, arg)?, arg)?),
            "--font" => config.options.font = Some(value(&args, &mut i, arg)?.to_string()),
            "--thumbnail" => {
                config.options.thumbnail = Some(number(value(&args, &mut i, arg)?, arg)?);
            }
            "--2x" => config.options.double = Some(1),
            "--no-2j" => config.options.clear_screen = Some(0),
            "--mode" => config.options.mode = Some(value(&args, &mut i, arg)?.to_string()),
            other if other.starts_with('-') && other.len() > 1 => {
                return Err(format!("Unknown argument: {}. Use -h for help.", other));
            }
            path => {
                if config.input.is_some() {
                    return Err(format!("Unexpected argument: {}", path));
                }
                config.input = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }

    if config.input.is_none() {
        return Err("Missing input file".to_string());
    }
    Ok(config)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn print_sauce(sauce: Option<&Sauce>) {
    let Some(sauce) = sauce else {
        println!("No SAUCE record");
        return;
    };
    println!("Title:    {}", sauce.title);
    println!("Author:   {}", sauce.author);
    println!("Group:    {}", sauce.group);
    println!("Date:     {}", sauce.date);
    println!("Version:  {}", sauce.version);
    println!("Type:     {}/{}", sauce.data_type, sauce.file_type);
    println!("Size:     {}x{}", sauce.tinfo1, sauce.tinfo2);
    println!("iCE:      {}", sauce.ice_colors);
    if !sauce.tinfo_s.is_empty() {
        println!("Font:     {}", sauce.tinfo_s);
    }
    for line in &sauce.comments {
        println!("Comment:  {}", line);
    }
}

/// Default output next to the input
fn output_path(input: &Path, animate: bool, raw: bool) -> PathBuf {
    let extension = if animate {
        "gif"
    } else if raw {
        "rgba"
    } else {
        "png"
    };
    input.with_extension(extension)
}

fn main() -> anyhow::Result<()> {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    init_logging(args.verbose);

    let Some(input) = args.input.clone() else {
        anyhow::bail!("Missing input file");
    };
    let bytes = fs::read(&input).with_context(|| format!("Failed to read {}", input.display()))?;

    // Command line overrides the config file field by field
    let app = AppConfig::load();
    let mut options = args.options.clone().or(&app.render);
    if options.filetype.is_none() {
        options.filetype = input
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());
    }

    if args.sauce {
        let source = ansiplay::ByteSource::new(bytes);
        print_sauce(source.sauce());
        return Ok(());
    }

    let config = RenderConfig::validate(&options);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| output_path(&input, args.animate, config.image_data));

    if args.animate {
        let baud = args.baud.or(app.baud);
        let mut playback = Playback::new(bytes, config);
        playback.play(baud, None, true);
        let recorder = GifRecorder::record(&mut playback, MAX_FRAMES)?;
        playback.stop();
        info!(
            "Writing {} frames at {} baud to {}",
            recorder.len(),
            playback.baud(),
            output.display()
        );
        recorder
            .save(&output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
    } else {
        let image = ansiplay::render_bytes(&bytes, &options);
        info!(
            "Writing {}x{} image to {}",
            image.width,
            image.height,
            output.display()
        );
        let written = if config.image_data {
            image.save_raw(&output)
        } else {
            image.save_png(&output)
        };
        written.with_context(|| format!("Failed to write {}", output.display()))?;
    }

    Ok(())
}
