mod autopilot;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use ashfield_common::seed_from_str;
use ashfield_kernel::LayoutBuilder;
use ashfield_render::{DebugTextRenderer, EventLog, FrameView, Presenter, RenderView, Renderer};
use ashfield_sim::{FrameClock, GameConfig, Outcome, Session};
use ashfield_theme::{
    FALLBACK_THEME, FileThemeSource, OfflineSource, ThemeCache, ThemeSource, resolve_theme,
    sanitize_theme_name,
};
use ashfield_tools::{AgentInfo, LayoutInspector};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::autopilot::Autopilot;

#[derive(Parser)]
#[command(name = "ashfield", about = "Seeds, layouts and headless runs of the ashfield town")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate list
    Info,
    /// Print the world seed a theme name maps to
    Seed {
        /// Theme name, sanitized before hashing
        theme: String,
    },
    /// Generate a layout and report on it
    Generate {
        #[arg(short, long, default_value = FALLBACK_THEME)]
        theme: String,
        /// Theme text used for anchor payloads
        #[arg(long, default_value = "")]
        text: String,
        /// Game config file (.yaml, .yml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print the full layout as JSON instead of the summary
        #[arg(long)]
        json: bool,
    },
    /// Print the default game config as YAML
    Defaults,
    /// Run a headless session driven by the autopilot
    Simulate {
        /// Requested theme; omit to let the source pick
        #[arg(short, long)]
        theme: Option<String>,
        /// JSON file of theme payloads; offline fallback when omitted
        #[arg(long)]
        theme_file: Option<PathBuf>,
        /// Directory for the theme cache
        #[arg(long)]
        cache_dir: Option<PathBuf>,
        /// Simulated seconds before giving up
        #[arg(short, long, default_value = "240")]
        seconds: f32,
        /// Fixed timestep in seconds; the frame period with --realtime
        #[arg(long, default_value = "0.0166667")]
        dt: f32,
        /// Pace frames on the wall clock and step by measured time
        #[arg(long)]
        realtime: bool,
        /// Game config file (.yaml, .yml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print a frame dump every N ticks (0 = final frame only)
        #[arg(long, default_value = "0")]
        every: u64,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<GameConfig> {
    let config = match path {
        Some(path) => GameConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    config.validate().context("invalid game config")?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("ashfield v{}", env!("CARGO_PKG_VERSION"));
            println!("crates: common, kernel, input, sim, theme, render, tools");
            println!("fallback theme: {FALLBACK_THEME}");
        }
        Commands::Seed { theme } => {
            let name = sanitize_theme_name(&theme);
            println!("{name}: {}", seed_from_str(&name));
        }
        Commands::Generate {
            theme,
            text,
            config,
            json,
        } => {
            let config = load_config(config.as_ref())?;
            let name = sanitize_theme_name(&theme);
            let layout = LayoutBuilder::new(config.layout.clone())
                .with_theme_name(name.as_str())
                .build(seed_from_str(&name), &text);
            if json {
                println!("{}", serde_json::to_string_pretty(&layout)?);
            } else {
                println!("Theme: {name}");
                println!("{}", LayoutInspector::summary(&layout));
                println!(
                    "{}",
                    LayoutInspector::clearance_report(&layout, config.nav.player_radius)
                );
            }
        }
        Commands::Defaults => {
            print!("{}", GameConfig::default().to_yaml()?);
        }
        Commands::Simulate {
            theme,
            theme_file,
            cache_dir,
            seconds,
            dt,
            realtime,
            config,
            every,
        } => {
            anyhow::ensure!(dt.is_finite() && dt > 0.0, "dt must be positive");
            let config = load_config(config.as_ref())?;

            let cache = cache_dir
                .map(|dir| ThemeCache::open(&dir).with_context(|| format!("opening cache {}", dir.display())))
                .transpose()?;
            let source: Box<dyn ThemeSource> = match theme_file {
                Some(path) => Box::new(FileThemeSource::new(path)),
                None => Box::new(OfflineSource),
            };
            let resolved = resolve_theme(source.as_ref(), cache.as_ref(), theme.as_deref());
            println!("Theme: {} ({:?})", resolved.payload.theme_name, resolved.origin);

            let mut session = Session::new(&resolved.payload.theme_name, &resolved.payload.text, config);
            println!("Seed: {}", session.seed());
            println!("{}", LayoutInspector::summary(session.layout()));

            let mut pilot = Autopilot::new(&session);
            let mut log = EventLog::new();
            let renderer = DebugTextRenderer::new();
            let mut clock = realtime.then(|| FrameClock::new(session.config().clock.clone()));
            let frame_period = Duration::try_from_secs_f32(dt).context("dt out of range")?;
            let max_ticks = (seconds / dt).ceil() as u64;

            loop {
                let step_dt = match clock.as_mut() {
                    Some(clock) => {
                        std::thread::sleep(frame_period);
                        clock.tick()
                    }
                    None => dt,
                };
                let input = pilot.next_input(&session, step_dt);
                let report = session.step(step_dt, &input);
                log.present(report.tension, &report.events);

                if every > 0 && report.tick % every == 0 {
                    let frame = FrameView::capture(&session);
                    print!("{}", renderer.render(&frame, &RenderView::from_pose(frame.player)));
                }
                let out_of_time = if clock.is_some() {
                    session.elapsed() >= seconds
                } else {
                    report.tick >= max_ticks
                };
                if report.outcome != Outcome::Running || out_of_time {
                    break;
                }
            }

            for line in log.lines() {
                println!("  {line}");
            }
            let frame = FrameView::capture(&session);
            print!("{}", renderer.render(&frame, &RenderView::from_pose(frame.player)));
            println!("{}", AgentInfo::of(session.agent()));
            println!("{}", session.profile());
            println!(
                "Outcome: {:?} after {:.1}s, {} of {} fragments, peak tension {:.3}",
                session.outcome(),
                session.elapsed(),
                session.collected(),
                session.collected() + session.clues_remaining(),
                log.peak_tension()
            );
        }
    }

    Ok(())
}
