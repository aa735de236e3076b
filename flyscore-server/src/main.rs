use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use flyscore_common::traits::repository_traits::ScoreboardRepository;
use flyscore_core::clock::SystemClock;
use flyscore_core::config::{AppConfig, ConfigOverrides, DataRootSettings};
use flyscore_core::repositories::{JsonHotkeyRepository, JsonScoreboardRepository};
use flyscore_core::seeder::seed_if_needed;
use flyscore_core::services::{HotkeyService, ScoreboardService};
use flyscore_server::SharedServer;
use flyscore_tui::{TuiContext, TuiModule};

#[derive(Parser, Debug, Clone)]
#[command(name = "flyscore")]
#[command(author, version, about = "Fly Scoreboard - serves a live scoreboard overlay from a local folder")]
struct Args {
    /// Document root (overrides FLY_SCORE_DATA_ROOT and the saved setting)
    #[arg(long)]
    data_root: Option<PathBuf>,

    /// First port to try (overrides FLY_SCORE_PORT and plugin.json)
    #[arg(long)]
    port: Option<u16>,

    /// How often running timers are flushed to disk, in ms. 0 disables.
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Run the console controller on stdin
    #[arg(long, short = 't', default_value = "false")]
    tui: bool,

    /// Do not write the default overlay files
    #[arg(long, default_value = "false")]
    no_seed: bool,
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_log::LogTracer::init()?;
    let filter = EnvFilter::from_default_env()
        .add_directive("flyscore=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing()?;
    let args = Args::parse();
    info!(
        "Fly Scoreboard starting. data_root={:?}, port={:?}, tui={}",
        args.data_root, args.port, args.tui
    );

    if let Err(e) = run(args).await {
        error!("Fatal: {:?}", e);
        return Err(e);
    }
    info!("Main finished. Goodbye!");
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let overrides = ConfigOverrides {
        data_root: args.data_root.clone(),
        port: args.port,
        tick_ms: args.tick_ms,
    };
    let settings = DataRootSettings::default_location();
    let cfg = AppConfig::resolve(overrides, settings.as_ref())?;

    let root = prepare_root(&cfg, args.no_seed);

    let scoreboard = Arc::new(ScoreboardService::new(
        Arc::new(JsonScoreboardRepository::new(&root)),
        Arc::new(SystemClock),
    ));
    let hotkeys = Arc::new(HotkeyService::new(
        Arc::new(JsonHotkeyRepository::new(&root)),
        scoreboard.clone(),
    ));

    let server = Arc::new(SharedServer::new(&root, tokio::runtime::Handle::current()));
    let preferred = cfg.port_or(scoreboard.snapshot().server_port);
    let port = server.start(preferred).await;
    if port == 0 {
        warn!("Overlay is not being served; the scoreboard still works locally.");
    } else {
        info!("Overlay: http://127.0.0.1:{}/overlay/", port);
    }

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let ticker = spawn_tick_task(scoreboard.clone(), cfg.tick_ms, shutdown_rx.clone());

    let tui = args.tui.then(|| {
        let module = TuiModule::new(
            TuiContext {
                scoreboard: scoreboard.clone(),
                hotkeys: hotkeys.clone(),
                doc_root: root.clone(),
                server: server.clone(),
            },
            shutdown_tx.clone(),
        );
        module.spawn_tui_thread();
        module
    });

    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                error!("Failed to listen for Ctrl-C: {:?}", e);
            }
            info!("Ctrl-C detected; shutting down...");
        }
        _ = async {
            while shutdown_rx.changed().await.is_ok() {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
        } => {
            info!("Shutdown requested from the console.");
        }
    }

    let _ = shutdown_tx.send(true);
    if let Some(module) = tui {
        module.shutdown();
    }
    if let Some(task) = ticker {
        let _ = task.await;
    }

    server.stop().await;

    if let Err(e) = scoreboard.save_now() {
        warn!("Final save failed: {}", e);
    }
    info!("Shutdown complete.");
    Ok(())
}

/// Seeds the root, or just makes sure plugin.json exists with `--no-seed`.
/// Failures are logged; the server can still run on a partial root.
fn prepare_root(cfg: &AppConfig, no_seed: bool) -> PathBuf {
    if no_seed {
        if let Err(e) = JsonScoreboardRepository::new(&cfg.data_root).ensure_exists(None) {
            warn!("Could not create plugin.json in {}: {}", cfg.data_root.display(), e);
        }
        return cfg.data_root.clone();
    }
    match seed_if_needed(&cfg.data_root) {
        Ok(root) => root,
        Err(e) => {
            warn!("Seeding {} failed: {}", cfg.data_root.display(), e);
            cfg.data_root.clone()
        }
    }
}

/// Flushes running timers every `tick_ms` so readers of plugin.json see
/// fresh values even without a controller touching the document.
fn spawn_tick_task(
    scoreboard: Arc<ScoreboardService>,
    tick_ms: u64,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Option<JoinHandle<()>> {
    if tick_ms == 0 {
        info!("Periodic timer flush disabled");
        return None;
    }
    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(tick_ms));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let sb = scoreboard.clone();
                    if let Err(e) = tokio::task::spawn_blocking(move || sb.tick()).await {
                        error!("Timer flush task failed: {}", e);
                    }
                }
                Ok(_) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    }))
}
