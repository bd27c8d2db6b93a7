use std::{fs::File, io::BufWriter, path::PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::ResetColor;
use crossterm::terminal::{Clear, ClearType};

use blockreel::{
    ContainerStore, CrosstermSink, DEFAULT_CACHE_BUDGET_BYTES, Fps, FrameSource, LifeSource,
    PlaybackOpts, PlaybackSession, PlaybackStats, VideoSource,
};

#[derive(Parser, Debug)]
#[command(name = "blockreel", version, about = "Play animations in the terminal with colored blocks")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play Conway's Game of Life from a random board.
    Life(LifeArgs),
    /// Play a video file (requires `ffmpeg` on PATH).
    Video(VideoArgs),
}

#[derive(Args, Debug)]
struct LifeArgs {
    /// Seed for the initial board. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Seconds of simulation per pass.
    #[arg(long, default_value_t = 30)]
    duration: u64,

    #[command(flatten)]
    playback: PlaybackArgs,
}

#[derive(Args, Debug)]
struct VideoArgs {
    /// Input video file.
    path: PathBuf,

    #[command(flatten)]
    playback: PlaybackArgs,
}

#[derive(Args, Debug)]
struct PlaybackArgs {
    /// Frame width in cells. Defaults to the terminal width.
    #[arg(long)]
    width: Option<u32>,

    /// Frame height in cells. Defaults to the terminal height.
    #[arg(long)]
    height: Option<u32>,

    /// Target frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Number of passes to play; 0 loops forever.
    #[arg(long, default_value_t = 1)]
    loops: u64,

    /// Generate frames live instead of using the frame cache.
    #[arg(long)]
    no_cache: bool,

    /// Frame cache directory. Defaults to the OS temp dir.
    #[arg(long, env = "BLOCKREEL_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Play live once the estimated frame cache reaches this many bytes.
    #[arg(long, default_value_t = DEFAULT_CACHE_BUDGET_BYTES)]
    cache_budget: u64,

    /// Write playback statistics as JSON to this path when done.
    #[arg(long)]
    stats_json: Option<PathBuf>,
}

impl PlaybackArgs {
    fn resolution(&self) -> anyhow::Result<(u32, u32)> {
        let (cols, rows) = match (self.width, self.height) {
            (Some(w), Some(h)) => return Ok((w, h)),
            _ => crossterm::terminal::size().context("query terminal size")?,
        };
        Ok((
            self.width.unwrap_or(u32::from(cols)),
            self.height.unwrap_or(u32::from(rows)),
        ))
    }

    fn fps(&self) -> anyhow::Result<Fps> {
        Ok(Fps::whole(self.fps)?)
    }

    fn store(&self) -> Option<ContainerStore> {
        if self.no_cache {
            return None;
        }
        Some(
            self.cache_dir
                .clone()
                .map(ContainerStore::new)
                .unwrap_or_default(),
        )
    }

    fn opts(&self, fps: Fps, max_frames: Option<u64>) -> PlaybackOpts {
        PlaybackOpts {
            fps,
            max_frames,
            cache_budget_bytes: self.cache_budget,
        }
    }
}

#[derive(serde::Serialize)]
struct RunReport {
    width: u32,
    height: u32,
    fps: Fps,
    passes: u64,
    totals: Option<PlaybackStats>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Life(args) => cmd_life(args),
        Command::Video(args) => cmd_video(args),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_life(args: LifeArgs) -> anyhow::Result<()> {
    let (width, height) = args.playback.resolution()?;
    let fps = args.playback.fps()?;
    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, width, height, "seeding life board");

    let source = LifeSource::random(width, height, seed)?;
    let opts = args
        .playback
        .opts(fps, Some(fps.frames_for_secs(args.duration)));
    run(source, width, height, opts, &args.playback)
}

fn cmd_video(args: VideoArgs) -> anyhow::Result<()> {
    let (width, height) = args.playback.resolution()?;
    let fps = args.playback.fps()?;
    let store = args.playback.store();

    let source = VideoSource::open(&args.path, width, height, fps, store.as_ref())
        .with_context(|| format!("open video '{}'", args.path.display()))?;
    let opts = args.playback.opts(fps, None);
    run(source, width, height, opts, &args.playback)
}

fn run<S: FrameSource>(
    source: S,
    width: u32,
    height: u32,
    opts: PlaybackOpts,
    args: &PlaybackArgs,
) -> anyhow::Result<()> {
    let fps = opts.fps;
    let mut session = PlaybackSession::new(source, args.store(), opts);
    let mut sink = CrosstermSink::stdout();

    crossterm::execute!(std::io::stdout(), Hide)?;
    let mut report = RunReport {
        width,
        height,
        fps,
        passes: 0,
        totals: None,
    };
    let played = play_passes(&mut session, &mut sink, &mut report, args.loops);

    sink.finish()?;
    crossterm::execute!(
        std::io::stdout(),
        ResetColor,
        Clear(ClearType::All),
        MoveTo(0, 0),
        Show
    )?;
    played?;

    if let Some(totals) = &report.totals {
        tracing::info!(
            passes = report.passes,
            frames_shown = totals.frames_shown,
            frames_skipped = totals.frames_skipped,
            "playback finished"
        );
    }
    if let Some(path) = &args.stats_json {
        let f = File::create(path)
            .with_context(|| format!("create stats file '{}'", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(f), &report)
            .with_context(|| format!("write stats file '{}'", path.display()))?;
    }
    Ok(())
}

fn play_passes<S: FrameSource>(
    session: &mut PlaybackSession<S>,
    sink: &mut CrosstermSink<std::io::Stdout>,
    report: &mut RunReport,
    loops: u64,
) -> anyhow::Result<()> {
    session
        .prime(report.width, report.height, sink)
        .context("prepare playback")?;

    while loops == 0 || report.passes < loops {
        let stats = session.play(sink).context("play frames")?;
        report.passes += 1;
        match &mut report.totals {
            Some(totals) => totals.accumulate(&stats),
            None => report.totals = Some(stats),
        }
    }
    Ok(())
}
