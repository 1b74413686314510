use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scrollreel::{FrameLoader, FsLoader, PlayerConfig, ScrollSession, Viewport};

/// Upper bound on animation frames spent waiting for preload or spring settle.
const MAX_WAIT_FRAMES: usize = 3_600;

#[derive(Parser, Debug)]
#[command(name = "scrollreel", version)]
struct Cli {
    /// Log more (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the frame shown at one scroll position as a PNG.
    Frame(FrameArgs),
    /// Render evenly spaced scroll positions as numbered PNGs.
    Scrub(ScrubArgs),
    /// Print the beat opacities and offsets at one scroll position as JSON.
    Beats(BeatsArgs),
    /// Print the default configuration as JSON.
    Config,
}

#[derive(Parser, Debug)]
struct SurfaceArgs {
    /// Directory standing in for the site root (frames under `<assets>/sequence/`).
    #[arg(long)]
    assets: PathBuf,

    /// Player configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 1080)]
    height: u32,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    surface: SurfaceArgs,

    /// Scroll progress in [0, 1].
    #[arg(long)]
    progress: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ScrubArgs {
    #[command(flatten)]
    surface: SurfaceArgs,

    /// Number of scroll positions, including both ends.
    #[arg(long, default_value_t = 10)]
    steps: u32,

    /// Output directory for `scrub-NNNN.png`.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct BeatsArgs {
    /// Player configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Smoothed scroll progress in [0, 1].
    #[arg(long)]
    progress: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Scrub(args) => cmd_scrub(args),
        Command::Beats(args) => cmd_beats(args),
        Command::Config => cmd_config(),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PlayerConfig> {
    let cfg = match path {
        Some(p) => PlayerConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => PlayerConfig::default(),
    };
    cfg.validate().context("validate config")?;
    Ok(cfg)
}

fn open_session(args: &SurfaceArgs) -> anyhow::Result<ScrollSession> {
    let cfg = load_config(args.config.as_deref())?;
    let viewport = Viewport::new(args.width, args.height);
    let root = args.assets.clone();
    let session = ScrollSession::new(viewport, cfg, move |host| {
        Box::new(FsLoader::new(root, host.events())) as Box<dyn FrameLoader>
    })?;
    session
        .wait_until_ready(MAX_WAIT_FRAMES)
        .context("wait for frame sequence")?;
    Ok(session)
}

fn check_progress(p: f64) -> anyhow::Result<f64> {
    anyhow::ensure!(
        p.is_finite() && (0.0..=1.0).contains(&p),
        "progress must be within [0, 1], got {p}"
    );
    Ok(p)
}

fn render_at(session: &ScrollSession, progress: f64, out: &Path) -> anyhow::Result<()> {
    session.scroll_to_progress(progress);
    session.settle(MAX_WAIT_FRAMES)?;
    let img = session
        .snapshot()
        .context("canvas has nothing to snapshot (zero-sized viewport?)")?;

    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    img.save_with_format(out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", out.display()))?;

    eprintln!(
        "wrote {} (frame {})",
        out.display(),
        session.player().frame_index()
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let progress = check_progress(args.progress)?;
    let session = open_session(&args.surface)?;
    render_at(&session, progress, &args.out)
}

fn cmd_scrub(args: ScrubArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.steps >= 2, "--steps must be at least 2");
    let session = open_session(&args.surface)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    for step in 0..args.steps {
        let progress = f64::from(step) / f64::from(args.steps - 1);
        let out = args.out_dir.join(format!("scrub-{step:04}.png"));
        render_at(&session, progress, &out)?;
    }
    Ok(())
}

fn cmd_beats(args: BeatsArgs) -> anyhow::Result<()> {
    let progress = check_progress(args.progress)?;
    let cfg = load_config(args.config.as_deref())?;
    let seq = cfg.beat_sequencer()?;

    let report = serde_json::json!({
        "progress": progress,
        "frame": scrollreel::FrameIndex::from_progress(progress, cfg.sequence.frame_count).0,
        "scroll_indicator_opacity": seq.indicator_opacity(progress),
        "beats": seq.sample(progress),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    println!("{}", PlayerConfig::default().to_json_pretty()?);
    Ok(())
}
