//! Hook Relay - demo binary
//!
//! Drives the relay end to end with a synthetic capture source and prints
//! each delivered event as a JSON line.

use hook_relay::app::cli::{Cli, Commands, ConfigAction};
use hook_relay::app::config::RelayConfig;
use hook_relay::relay::session::HookSession;
use hook_relay::relay::types::{keycode, EventKind, HookEvent, RawEvent, WheelData, WheelDirection, WheelScroll};
use hook_relay::relay::RelayHandler;
use hook_relay::source::synthetic::SyntheticSource;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    // Initialize tracing (--verbose enables debug-level output)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Load config
    let config = if let Some(path) = &cli.config {
        RelayConfig::load(path)?
    } else {
        RelayConfig::load_default()?
    };

    match cli.command {
        Commands::Feed { count, debug } => {
            run_feed(count, debug, config)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", config.to_toml()?);
            }
            ConfigAction::Init => {
                let path = RelayConfig::default_path();
                config.save(&path)?;
                info!("wrote {}", path.display());
            }
        },
    }

    Ok(())
}

/// Prints every delivered event as one JSON line
struct JsonPrinter {
    delivered: Arc<AtomicU64>,
}

impl RelayHandler for JsonPrinter {
    fn on_event(&mut self, event: HookEvent) {
        if let Ok(line) = serde_json::to_string(&event) {
            println!("{line}");
        }
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    fn on_session_end(&mut self) {
        info!("session ended");
    }
}

fn run_feed(count: u64, debug: bool, config: RelayConfig) -> anyhow::Result<()> {
    let source = SyntheticSource::new()
        .with_events(synth_script(count))
        .auto_stop();

    let enable_debug = debug || config.debug;
    let mut session = HookSession::with_config(source, config)?;
    session.set_debug(enable_debug);

    let delivered = Arc::new(AtomicU64::new(0));
    session.start(Box::new(JsonPrinter {
        delivered: Arc::clone(&delivered),
    }))?;

    info!(session = %session.id(), "feeding {count} synthetic events");
    session.join();

    let stats = session.stats();
    info!(
        delivered = delivered.load(Ordering::Relaxed),
        relayed = stats.events_relayed.load(Ordering::Relaxed),
        discarded = stats.events_discarded.load(Ordering::Relaxed),
        "feed complete"
    );

    Ok(())
}

/// A varied script: key press/release pairs, pointer moves, a wheel notch
fn synth_script(count: u64) -> Vec<RawEvent> {
    (0..count)
        .map(|i| {
            let time = i * 10;
            match i % 4 {
                0 => RawEvent::keyboard(EventKind::KeyPressed, time, 0, keycode::A, 30, 0),
                1 => RawEvent::keyboard(EventKind::KeyReleased, time, 0, keycode::A, 30, 0),
                2 => RawEvent::mouse(EventKind::MouseMoved, time, 0, 0, 0, (i * 3) as i16, (i * 2) as i16),
                _ => RawEvent::wheel(
                    time,
                    0,
                    WheelData {
                        amount: 3,
                        clicks: 1,
                        direction: WheelDirection::Vertical,
                        rotation: -1,
                        scroll_kind: WheelScroll::Unit,
                        x: 0,
                        y: 0,
                    },
                ),
            }
        })
        .collect()
}
