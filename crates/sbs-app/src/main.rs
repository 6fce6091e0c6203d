//! SBS Studio - 2D to side-by-side stereo converter
//!
//! Command-line entry point. Decoding is external to the engine, so the
//! `batch` and `convert` commands run against a synthetic color-bar source
//! with the given metadata.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sbs_core::{optimal_pupil_distance, ConversionOptions, EngineConfig, VideoRef};
use sbs_effects::StereoPipeline;
use sbs_media::{
    BatchController, ConversionSession, FrameCache, FrameRequest, ResultCache, SamplingPlanner,
    SessionConfig, TestPatternSource, VideoMetadata,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "sbs", about = "Convert 2D video frames into side-by-side stereo pairs")]
struct Cli {
    /// Engine config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging when RUST_LOG is unset
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check conversion options against the accepted ranges
    Validate(StereoArgs),
    /// Suggest a pupil distance for a screen width
    Suggest {
        /// Screen width in millimeters
        #[arg(long)]
        screen_width: f64,
        /// Viewing distance in millimeters
        #[arg(long, default_value_t = 600.0)]
        viewing_distance: f64,
    },
    /// Show the memory-budgeted sampling plan for a video
    Plan(VideoArgs),
    /// Extract and synthesize a frame range
    Batch {
        #[command(flatten)]
        video: VideoArgs,
        #[command(flatten)]
        stereo: StereoArgs,
        /// First frame index
        #[arg(long, default_value_t = 0)]
        start: u64,
        /// End frame index (exclusive)
        #[arg(long, default_value_t = 30)]
        end: u64,
    },
    /// Run a whole-video conversion session
    Convert {
        #[command(flatten)]
        video: VideoArgs,
        #[command(flatten)]
        stereo: StereoArgs,
    },
}

#[derive(Args, Clone)]
struct StereoArgs {
    /// Interpupillary distance in millimeters
    #[arg(long, default_value_t = 63.0)]
    pupil_distance: f64,
    /// Convergence distance in millimeters
    #[arg(long, default_value_t = 2000.0)]
    convergence_distance: f64,
}

impl StereoArgs {
    fn options(&self) -> ConversionOptions {
        ConversionOptions::new(self.pupil_distance, self.convergence_distance)
    }
}

#[derive(Args, Clone)]
struct VideoArgs {
    /// Video locator
    #[arg(long, default_value = "synthetic://color-bars")]
    video: String,
    /// File size in bytes
    #[arg(long, default_value_t = 0)]
    size_bytes: u64,
    /// Duration in seconds
    #[arg(long, default_value_t = 60.0)]
    duration: f64,
    /// Frames per second (defaults to the config value)
    #[arg(long)]
    fps: Option<f64>,
    /// Frame width in pixels
    #[arg(long, default_value_t = 1920)]
    width: u32,
    /// Frame height in pixels
    #[arg(long, default_value_t = 1080)]
    height: u32,
}

impl VideoArgs {
    fn metadata(&self, config: &EngineConfig) -> VideoMetadata {
        VideoMetadata {
            size_bytes: self.size_bytes,
            duration_secs: self.duration,
            fps: self.fps.unwrap_or(config.default_fps),
            width: self.width,
            height: self.height,
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick a level from the verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "sbs_app=debug,sbs_media=debug,sbs_effects=debug,sbs_core=debug".to_string()
        } else {
            "info".to_string()
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Validate(stereo) => {
            print_json(&stereo.options().validate())?;
        }
        Commands::Suggest {
            screen_width,
            viewing_distance,
        } => {
            let pd = optimal_pupil_distance(screen_width, viewing_distance);
            println!("{pd:.1}");
        }
        Commands::Plan(video) => {
            let meta = video.metadata(&config);
            let plan = SamplingPlanner::from_config(&config).plan(
                meta.size_bytes,
                meta.duration_secs,
                meta.fps,
            );
            print_json(&plan)?;
        }
        Commands::Batch {
            video,
            stereo,
            start,
            end,
        } => {
            let meta = video.metadata(&config);
            let source = TestPatternSource::new(meta);
            let pipeline = StereoPipeline::new(&stereo.options(), config.color);
            let controller = BatchController::new(
                source,
                FrameCache::shared(config.frame_cache_capacity),
                pipeline,
            )
            .with_per_frame_bytes(config.per_frame_bytes());

            let video_ref = VideoRef::new(video.video);
            let report = controller
                .process_batch(
                    &video_ref,
                    start,
                    end,
                    FrameRequest::rgba(meta.width, meta.height),
                    |p| info!(progress = p, "Batch progress"),
                )
                .await;

            let stats = controller.buffer_stats();
            info!(
                cached = stats.cached_frames,
                estimated_mib = stats.estimated_mib(),
                "Buffer stats"
            );
            print_json(&controller.state())?;

            let frames = report.into_result().context("Batch did not complete")?;
            println!("produced {} stereo frames", frames.len());
        }
        Commands::Convert { video, stereo } => {
            let session =
                ConversionSession::new(Arc::new(ResultCache::new()), SessionConfig::from(&config));
            let options = stereo.options();

            let mut progress = session.subscribe();
            let watcher = tokio::spawn(async move {
                while progress.changed().await.is_ok() {
                    let state = progress.borrow_and_update().clone();
                    info!(progress = state.progress(), "Conversion progress");
                    if state.is_terminal() {
                        break;
                    }
                }
            });

            let result = session
                .convert(&VideoRef::new(video.video), &options)
                .await
                .context("Conversion failed")?;
            if let Some(report) = session.last_validation().filter(|r| !r.valid) {
                print_json(&report)?;
            }
            watcher.abort();
            print_json(result.as_ref())?;
        }
    }

    Ok(())
}
