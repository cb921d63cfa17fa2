use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use motecast::{
    FileFrameSource, FrameCache, GestureRegistry, LoggingAdvertiser, MotecastConfig,
    StreamServerBuilder, VolumeControl,
};

#[derive(Parser, Debug)]
#[command(name = "motecast")]
#[command(about = "Screen streaming and remote control server")]
#[command(version)]
#[command(long_about = "Serves the device's screen as a multi-client MJPEG stream and accepts \
JSON control requests for volume and touch/gesture injection, remapping pointer coordinates \
from the capture resolution to the real device resolution.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "motecast.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without starting the server")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Feed a JPEG file on loop as the frame source (for testing viewers
    /// without a capture pipeline)
    #[arg(long, value_name = "PATH", help = "JPEG file to stream on loop instead of live capture")]
    frame_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print_default_config()?;
        return Ok(());
    }

    init_logging(&args)?;

    info!("Starting motecast v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let config = match MotecastConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if args.validate_config {
        match config.validate() {
            Ok(()) => {
                println!("✓ Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    config.validate()?;

    let cache = Arc::new(FrameCache::new());
    let volume = Arc::new(VolumeControl::new(config.volume.max, config.volume.initial));
    let registry = Arc::new(GestureRegistry::new());
    let shutdown = CancellationToken::new();

    // The capture producer and the gesture injector are platform
    // collaborators wired in by the embedding application; this binary only
    // starts the optional file-backed frame source.
    if let Some(path) = &args.frame_file {
        let source = FileFrameSource::from_file(
            path,
            Arc::clone(&cache),
            config.server.target_fps,
        )?;
        source.spawn(shutdown.clone());
    }

    let server = StreamServerBuilder::new()
        .config(config.server.clone())
        .discovery(config.discovery.clone())
        .cache(Arc::clone(&cache))
        .volume(volume)
        .registry(Arc::clone(&registry))
        .geometry(config.screen.geometry())
        .advertiser(Arc::new(LoggingAdvertiser))
        .shutdown(shutdown.clone())
        .build()?;

    let ctrl_c_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, shutting down");
            ctrl_c_shutdown.cancel();
        }
    });

    server.start().await?;

    info!("motecast stopped");
    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("motecast={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer().with_target(true).boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();

    Ok(())
}

/// Print default configuration in TOML format
fn print_default_config() -> Result<()> {
    println!("# Motecast Configuration File");
    println!("# This is the default configuration with all available options");
    println!();
    println!("{}", toml::to_string_pretty(&MotecastConfig::default())?);
    Ok(())
}
