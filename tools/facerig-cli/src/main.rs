//! FaceRig CLI: command-line interface for capturing and replaying facial animation.
//!
//! Usage:
//!   facerig record --input <DUMP>   Map a tracking dump and record it
//!   facerig replay <LOG>            Apply a recorded log to a rig
//!   facerig info <LOG>              Show animation log statistics
//!   facerig validate                Check the mapping and rig configuration
//!   facerig init                    Write the default configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use facerig_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "facerig",
    about = "Retarget facial tracking onto character rigs",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to $XDG_CONFIG_HOME/facerig/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map a tracking dump to control signals and record them
    Record {
        /// Tracking dump, one sample JSON object per line
        #[arg(short, long)]
        input: PathBuf,

        /// Animation log to write
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Capture cadence
        #[arg(long)]
        fps: Option<u32>,

        /// Do not drive the rig while recording
        #[arg(long)]
        no_preview: bool,

        /// Stop on the first malformed frame instead of dropping it
        #[arg(long)]
        abort_on_error: bool,

        /// Smoothing strength [0.0, 1.0]
        #[arg(long)]
        smoothing: Option<f64>,

        /// Rig description JSON (defaults to the built-in rig)
        #[arg(long)]
        rig: Option<PathBuf>,

        /// Write the previewed rig's keyframes to this file
        #[arg(long)]
        bake: Option<PathBuf>,

        /// Stop after this many frames
        #[arg(long)]
        max_frames: Option<u64>,
    },

    /// Apply a recorded animation log to a rig
    Replay {
        /// Animation log
        log: PathBuf,

        /// Rig description JSON (defaults to the built-in rig)
        #[arg(long)]
        rig: Option<PathBuf>,

        /// Write the keyframed animation to this file
        #[arg(long)]
        bake: Option<PathBuf>,

        /// Scene frame rate
        #[arg(long)]
        fps: Option<u32>,

        /// Treat the first frame as a neutral face; full weight at this multiple of it
        #[arg(long, value_name = "RANGE")]
        calibrate_first_frame: Option<f64>,
    },

    /// Show animation log statistics
    Info {
        /// Animation log
        log: PathBuf,

        /// Frame rate used for the duration
        #[arg(long)]
        fps: Option<u32>,
    },

    /// Check the mapping table and rig binding
    Validate {
        /// Landmark count of the tracking model
        #[arg(long)]
        landmarks: Option<usize>,

        /// Rig description JSON (defaults to the built-in rig)
        #[arg(long)]
        rig: Option<PathBuf>,
    },

    /// Write the default configuration
    Init {
        /// Destination (defaults to the standard config location)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    facerig_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Record {
            input,
            output,
            fps,
            no_preview,
            abort_on_error,
            smoothing,
            rig,
            bake,
            max_frames,
        } => {
            commands::record::run(
                &config,
                commands::record::RecordArgs {
                    input,
                    output,
                    fps,
                    preview: !no_preview,
                    abort_on_error,
                    smoothing,
                    rig,
                    bake,
                    max_frames,
                },
            )
            .await
        }
        Commands::Replay {
            log,
            rig,
            bake,
            fps,
            calibrate_first_frame,
        } => commands::replay::run(&config, log, rig, bake, fps, calibrate_first_frame),
        Commands::Info { log, fps } => commands::info::run(&config, log, fps),
        Commands::Validate { landmarks, rig } => commands::validate::run(&config, landmarks, rig),
        Commands::Init { output, force } => commands::init::run(output, force),
    }
}
