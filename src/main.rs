use anyhow::Result;
use app_icon_kit::{
    apply::{apply_icons, ApplyOptions},
    render::{generate, GenerateOptions},
    style::{IconStyle, PRESETS},
    targets::{Manifest, DEFAULT_GROUPS},
};
use clap::{Parser, Subcommand};
use image::Rgba;
use std::{path::PathBuf, str::FromStr};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[clap(
    name = "app-icon-kit",
    about = "Render app icons and apply them to every platform's packaging sizes"
)]
struct Cli {
    /// Log more detail (-v for info, -vv for debug)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render icon designs into square PNG sources
    Generate(GenerateArgs),
    /// Resize a source icon into every platform location of a project
    Apply(ApplyArgs),
}

#[derive(Debug, clap::Args)]
struct GenerateArgs {
    /// Builtin designs to render (ticket, admin). Defaults to all of them.
    #[clap(short, long, value_delimiter = ',', value_name = "NAMES")]
    preset: Vec<String>,

    /// Designs loaded from JSON style files
    #[clap(long, value_name = "FILE")]
    style: Vec<PathBuf>,

    /// Render glyph text with this font instead of the builtin shapes
    #[clap(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Face index inside a font collection (.ttc)
    #[clap(long, default_value_t = 0)]
    font_index: u32,

    /// Edge length of the rendered icons in pixels
    #[clap(long, default_value_t = 1024)]
    size: u32,

    /// Seed for the noise layer. A random seed is logged when omitted.
    #[clap(long)]
    seed: Option<u64>,

    /// Output directory.
    #[clap(short, long, value_name = "DIR", default_value = "./icon_sources")]
    output: PathBuf,
}

#[derive(Debug, clap::Args)]
struct ApplyArgs {
    /// Path to the source icon (squared PNG, ideally 1024x1024).
    #[clap(value_name = "INPUT")]
    input: PathBuf,

    /// Project directory the icon locations are relative to.
    #[clap(short, long, value_name = "DIR", default_value = ".")]
    project: PathBuf,

    /// JSON manifest replacing the builtin Flutter locations
    #[clap(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Write iOS asset catalog icons
    #[clap(long)]
    ios: bool,

    /// Write Android launcher icons
    #[clap(long)]
    android: bool,

    /// Write macOS asset catalog icons
    #[clap(long)]
    macos: bool,

    /// Write the web favicon and PWA icons
    #[clap(long)]
    web: bool,

    /// Write the Windows runner icon
    #[clap(long)]
    windows: bool,

    /// Also write Contents.json into each asset catalog icon set
    #[clap(long)]
    contents_json: bool,

    /// The background color for icons that must be opaque (CSS color format)
    #[clap(long, default_value = "#000000")]
    background: String,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Apply(args) => run_apply(args),
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let mut names = args.preset;
    if names.is_empty() && args.style.is_empty() {
        names = PRESETS.iter().map(|name| name.to_string()).collect();
    }

    let mut styles = Vec::new();
    for name in &names {
        styles.push(IconStyle::preset(name)?);
    }
    for path in &args.style {
        styles.push(IconStyle::from_file(path)?);
    }

    let written = generate(&GenerateOptions {
        output: args.output,
        size: args.size,
        styles,
        font: args.font,
        font_index: args.font_index,
        seed: args.seed,
    })?;

    println!("\nDone!");
    for path in written {
        println!("  {}", path.display());
    }
    Ok(())
}

/// Groups picked by the platform flags. Without flags the builtin tables
/// write every mobile, desktop and web platform except Windows, while a
/// custom manifest writes all of its groups.
fn selected_groups(args: &ApplyArgs) -> Vec<String> {
    let flags = [
        ("ios", args.ios),
        ("android", args.android),
        ("macos", args.macos),
        ("web", args.web),
        ("windows", args.windows),
    ];
    let picked: Vec<String> = flags
        .iter()
        .filter(|(_, on)| *on)
        .map(|(name, _)| name.to_string())
        .collect();

    if picked.is_empty() && args.manifest.is_none() {
        DEFAULT_GROUPS.iter().map(|name| name.to_string()).collect()
    } else {
        picked
    }
}

fn parse_background(color: &str) -> Rgba<u8> {
    css_color::Srgb::from_str(color)
        .map(|color| {
            Rgba([
                (color.red * 255.) as u8,
                (color.green * 255.) as u8,
                (color.blue * 255.) as u8,
                255,
            ])
        })
        .unwrap_or_else(|_| {
            tracing::warn!(color, "unrecognised background colour, using black");
            Rgba([0, 0, 0, 255])
        })
}

fn run_apply(args: ApplyArgs) -> Result<()> {
    let manifest = match &args.manifest {
        Some(path) => Manifest::from_file(path)?,
        None => Manifest::flutter(),
    };
    let groups = selected_groups(&args);
    let background = parse_background(&args.background);

    let report = apply_icons(&ApplyOptions {
        source: args.input,
        project: args.project,
        manifest,
        groups,
        contents_json: args.contents_json,
        background,
    })?;

    println!("\nAll icons applied! ({} files)", report.written.len());
    Ok(())
}
