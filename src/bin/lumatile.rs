use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lumatile", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a lift/gamma/gain color balance to an image.
    Grade(GradeArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Rows,
    Sampled,
}

#[derive(Parser, Debug)]
struct GradeArgs {
    /// Input image (sRGB-encoded, e.g. PNG).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output image path; the format follows the extension.
    #[arg(long)]
    out: PathBuf,

    /// Grade config JSON; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Shadow offset as `r,g,b`.
    #[arg(long, value_parser = parse_rgb)]
    lift: Option<[f32; 3]>,

    /// Midtone gamma as `r,g,b`.
    #[arg(long, value_parser = parse_rgb)]
    gamma: Option<[f32; 3]>,

    /// Highlight gain as `r,g,b`.
    #[arg(long, value_parser = parse_rgb)]
    gain: Option<[f32; 3]>,

    /// Blend factor between original and graded color.
    #[arg(long)]
    factor: Option<f32>,

    /// Tile evaluation mode.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Tile edge length in pixels.
    #[arg(long)]
    tile_size: Option<u32>,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

fn parse_rgb(s: &str) -> Result<[f32; 3], String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("'{p}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [r, g, b] => Ok([*r, *g, *b]),
        [v] => Ok([*v; 3]),
        _ => Err(format!("expected 'r,g,b' or a single value, got '{s}'")),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Grade(args) => cmd_grade(args),
    }
}

fn cmd_grade(args: GradeArgs) -> anyhow::Result<()> {
    let mut cfg = match &args.config {
        Some(path) => lumatile::GradeConfig::from_path(path)?,
        None => lumatile::GradeConfig::default(),
    };
    if let Some(lift) = args.lift {
        cfg.grade.lift = lift;
    }
    if let Some(gamma) = args.gamma {
        cfg.grade.gamma = gamma;
    }
    if let Some(gain) = args.gain {
        cfg.grade.gain = gain;
    }
    if let Some(factor) = args.factor {
        cfg.factor = factor;
    }
    if let Some(mode) = args.mode {
        cfg.execution.mode = match mode {
            ModeArg::Rows => lumatile::ExecutionMode::Rows,
            ModeArg::Sampled => lumatile::ExecutionMode::Sampled,
        };
    }
    if let Some(tile_size) = args.tile_size {
        cfg.execution.tile_size = tile_size;
    }
    if args.threads.is_some() {
        cfg.execution.threads = args.threads;
    }

    let mut pixels = image::open(&args.in_path)
        .with_context(|| format!("read image '{}'", args.in_path.display()))?
        .into_rgba32f();
    for px in pixels.pixels_mut() {
        for c in &mut px.0[..3] {
            *c = lumatile::srgb_to_linear(*c);
        }
    }
    let source = Arc::new(lumatile::MemoryBuffer::from_rgba32f(&pixels)?);

    let (mut graph, balance) = cfg.build_graph(source)?;
    graph.init_execution()?;
    let rendered = lumatile::render(&graph, balance, &cfg.execution);
    graph.deinit_execution();
    let mut graded = rendered?.to_rgba32f()?;

    for px in graded.pixels_mut() {
        for c in &mut px.0[..3] {
            *c = lumatile::linear_to_srgb(*c);
        }
    }

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::DynamicImage::ImageRgba32F(graded)
        .to_rgba8()
        .save(&args.out)
        .with_context(|| format!("write image '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
