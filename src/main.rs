//! Balloon Burst headless runner
//!
//! Plays one session with the demo player at a fixed 60 Hz step and prints
//! the results as JSON. Useful for balancing content and settings files.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use anyhow::{Context, Result, anyhow};
    use clap::Parser;

    use balloon_burst::autoplay::AutoPlayer;
    use balloon_burst::consts::{DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, FRAME_DT};
    use balloon_burst::ports::Ports;
    use balloon_burst::sim::{DeviceClass, GameEvent, SessionResults, Viewport};
    use balloon_burst::{Catalog, GameSettings, Session};

    #[derive(Parser, Debug)]
    #[command(name = "balloon-burst")]
    #[command(about = "Run a headless Balloon Burst session with the demo player")]
    struct Args {
        /// RNG seed for gameplay
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Give up after this many simulated seconds
        #[arg(long, default_value_t = 300.0)]
        seconds: f32,

        /// Target types and stages JSON (builtin content when omitted)
        #[arg(long)]
        content: Option<PathBuf>,

        /// Game settings JSON (defaults when omitted)
        #[arg(long)]
        settings: Option<PathBuf>,

        #[arg(long, default_value_t = DEFAULT_VIEWPORT_WIDTH)]
        width: f32,

        #[arg(long, default_value_t = DEFAULT_VIEWPORT_HEIGHT)]
        height: f32,

        /// Share of demo taps aimed at a target, 0..=1
        #[arg(long, default_value_t = 0.85)]
        accuracy: f32,

        /// Print every game event as a JSON line
        #[arg(long)]
        events: bool,
    }

    fn read(path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }

    fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
        match path {
            Some(path) => Catalog::from_json(&read(path)?)
                .with_context(|| format!("parsing content {}", path.display())),
            None => Ok(Catalog::builtin()),
        }
    }

    fn load_settings(path: Option<&Path>) -> Result<GameSettings> {
        match path {
            Some(path) => GameSettings::from_json(&read(path)?)
                .with_context(|| format!("parsing settings {}", path.display())),
            None => Ok(GameSettings::default()),
        }
    }

    pub fn run() -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let args = Args::parse();
        if !(args.width > 0.0 && args.height > 0.0) {
            return Err(anyhow!("viewport must be positive, got {}x{}", args.width, args.height));
        }

        let catalog = Arc::new(load_catalog(args.content.as_deref())?);
        let settings = load_settings(args.settings.as_deref())?;

        let mut session = Session::new(catalog, settings, args.seed, Ports::logging());
        session.set_viewport(Viewport::new(args.width, args.height));
        let mut player = AutoPlayer::new(args.seed.wrapping_add(1), args.accuracy);

        let max_frames = (args.seconds.max(0.0) / FRAME_DT) as u64;
        let mut results: Option<SessionResults> = None;

        for _ in 0..max_frames {
            let mut events = session.on_tick(FRAME_DT);
            if let Some(point) = player.next_tap(&session, FRAME_DT) {
                events.extend(session.on_input(point, DeviceClass::Touch));
            }

            for event in events {
                if args.events {
                    println!("{}", serde_json::to_string(&event)?);
                }
                if let GameEvent::ResultsReady(r) = event {
                    results = Some(r);
                }
            }
            if results.is_some() {
                break;
            }
        }

        // Out of time before HP ran out
        let results = match results {
            Some(results) => results,
            None => {
                log::info!("Time limit reached after {}s", args.seconds);
                SessionResults {
                    score: session.state().score,
                    stage: session.stage().id,
                    stats: session.state().stats.clone(),
                }
            }
        };

        log::info!(
            "Final score {} on stage {} (miss rate {:.1}%)",
            results.score,
            results.stage,
            results.stats.miss_rate()
        );
        println!("{}", serde_json::to_string_pretty(&results)?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
