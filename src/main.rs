//! ASCII black hole - a lensed ray marcher that renders to the terminal
//!
//! Controls:
//! - 1-4: Toggle starfield / planets / disk / lensing
//! - +/-: Adjust black hole mass
//! - [/]: Adjust disk outer radius
//! - Arrows: Orbit the camera
//! - w/s: Zoom in/out
//! - R: Reset to defaults
//! - Space: Pause
//! - Q or Escape: Quit

use anyhow::Context;
use ascii_blackhole::config::AppConfig;
use ascii_blackhole::renderer::Renderer;
use ascii_blackhole::session::{Flow, Session};
use ascii_blackhole::terminal::{parse_key_event, Input, TerminalDisplay};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Png,
    Ascii,
}

#[derive(Parser)]
#[command(name = "ascii-blackhole")]
#[command(version = "0.1.0")]
#[command(about = "Gravitationally lensed black hole renderer for the terminal")]
#[command(long_about = "
ascii-blackhole marches camera rays through a stylised curved spacetime around a
black hole, compositing an accretion disk, two orbiting planets and a starfield.

Example usage:
  ascii-blackhole run
  ascii-blackhole render --frames 10 --format png --output-dir frames
  ascii-blackhole check-config --config blackhole.yaml
")]
struct Cli {
    /// Path to config file (defaults to ./blackhole.yaml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Set logging level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal viewer (default)
    Run,

    /// Render frames to files without a terminal
    Render {
        /// Number of frames to render
        #[arg(short, long, default_value_t = 10)]
        frames: u32,
        /// Output directory
        #[arg(short, long, default_value = "frames")]
        output_dir: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Png)]
        format: OutputFormat,
        /// Override width in pixels
        #[arg(long)]
        width: Option<usize>,
        /// Override height in pixels
        #[arg(long)]
        height: Option<usize>,
        /// Simulated seconds between frames
        #[arg(long, default_value_t = 0.5)]
        time_step: f32,
    },

    /// Validate configuration file
    CheckConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level_filter = if let Some(level) = cli.log_level {
        level.to_string()
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            .to_string()
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&level_filter))
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load_or_default(cli.config.as_deref())
        .with_context(|| format!("loading configuration {:?}", cli.config))?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_interactive(&config)?,
        Commands::Render {
            frames,
            output_dir,
            format,
            width,
            height,
            time_step,
        } => {
            let width = width.unwrap_or(config.render.width);
            let height = height.unwrap_or(config.render.height);
            render_frames(&config, frames, &output_dir, format, (width, height), time_step)?;
        }
        Commands::CheckConfig => check_config(&config),
    }

    Ok(())
}

/// Interactive terminal loop
fn run_interactive(config: &AppConfig) -> anyhow::Result<()> {
    let mut terminal = TerminalDisplay::new().context("initializing terminal")?;

    // Half-block cells carry two vertical pixels each
    let (width, height) = terminal.get_size();
    let mut renderer = Renderer::new(width.max(10), (height * 2).max(10));
    let mut session = Session::from_config(config);

    let frame_interval = Duration::from_millis(config.render.frame_interval_ms);
    let mut last_frame = Instant::now();

    tracing::info!(
        width = renderer.width(),
        height = renderer.height(),
        "interactive session started"
    );

    'main_loop: loop {
        match terminal.poll_input(Duration::from_millis(5)) {
            Ok(Some(Input::Key(key_event))) => {
                if session.apply(parse_key_event(key_event)) == Flow::Quit {
                    break 'main_loop;
                }
            }
            Ok(Some(Input::Resize)) => {
                let (width, height) = terminal.get_size();
                renderer.resize(width.max(10), (height * 2).max(10));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "input error"),
        }

        // Paused frames are not redrawn, which keeps text selectable
        if session.is_paused() {
            last_frame = Instant::now();
            continue;
        }

        let elapsed = last_frame.elapsed();
        if elapsed < frame_interval {
            continue;
        }
        last_frame = Instant::now();
        session.advance(elapsed);

        // Only the work counts toward the frame rate, not the pacing wait
        let render_start = Instant::now();
        renderer.render(&session.frame());
        let output = renderer.to_ascii_halfblock();
        let drawn = terminal.render(&output, &session.status_line());
        session.record_frame_time(render_start.elapsed());

        if let Err(e) = drawn {
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                break;
            }
            tracing::warn!(error = %e, "render error");
        }
    }

    drop(terminal);
    println!("\nThanks for watching!");
    Ok(())
}

/// Offline mode: render a sequence of frames to files
fn render_frames(
    config: &AppConfig,
    frames: u32,
    output_dir: &Path,
    format: OutputFormat,
    (width, height): (usize, usize),
    time_step: f32,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    let mut renderer = Renderer::new(width, height);
    let mut session = Session::from_config(config);
    let step = Duration::try_from_secs_f32(time_step.max(0.0))
        .with_context(|| format!("invalid --time-step {}", time_step))?;

    tracing::info!(frames, width, height, dir = %output_dir.display(), "rendering frames");

    for index in 0..frames {
        let started = Instant::now();
        renderer.render(&session.frame());

        let path = match format {
            OutputFormat::Png => {
                let path = output_dir.join(format!("frame_{:03}.png", index));
                renderer.save_png(&path)?;
                path
            }
            OutputFormat::Ascii => {
                let path = output_dir.join(format!("frame_{:03}.txt", index));
                std::fs::write(&path, renderer.to_ascii())
                    .with_context(|| format!("writing {}", path.display()))?;
                path
            }
        };

        tracing::info!(
            path = %path.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "wrote frame"
        );
        // The frame rate stays unknown offline, so every frame gets the same quality
        session.advance(step);
    }

    Ok(())
}

/// Print the effective configuration
fn check_config(config: &AppConfig) {
    println!("✓ Configuration is valid\n");
    println!("Render:");
    println!("  Size: {}x{}", config.render.width, config.render.height);
    println!("  Frame interval: {}ms", config.render.frame_interval_ms);
    println!("  Time scale: {}", config.render.time_scale);
    println!("\nSimulation:");
    println!("  Mass: {}", config.simulation.mass);
    println!("  Disk outer radius: {}", config.simulation.disk_outer_radius);
    println!("  Features: {}", config.simulation.features.summary());
    let params = config.simulation.params();
    if params.disk_is_degenerate() {
        println!(
            "  Warning: disk inner radius {} reaches the outer radius; the disk will be empty",
            params.disk_inner_radius()
        );
    }
    println!("\nCamera:");
    println!(
        "  Azimuth: {} Elevation: {} Radius: {}",
        config.camera.azimuth, config.camera.elevation, config.camera.radius
    );
}
