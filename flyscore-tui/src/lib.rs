use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;

use tokio::sync::watch;
use tracing::info;

use flyscore_core::services::{HotkeyService, ScoreboardService};

pub mod commands;

/// The console's handle on the document server. Calls block the console
/// thread until the server has answered.
pub trait ServerControl: Send + Sync {
    /// Bound port, 0 when the server is not running.
    fn port(&self) -> u16;
    /// Stops the server if it runs and starts it again on the first free
    /// port from `preferred_port`. Returns the bound port, 0 on failure.
    fn restart(&self, preferred_port: u16) -> u16;
    /// One health probe against the current port.
    fn is_healthy(&self) -> bool;
}

/// Everything a console command can reach.
pub struct TuiContext {
    pub scoreboard: Arc<ScoreboardService>,
    pub hotkeys: Arc<HotkeyService>,
    pub doc_root: PathBuf,
    pub server: Arc<dyn ServerControl>,
}

/// Line-oriented scoreboard controller on stdin/stdout.
pub struct TuiModule {
    ctx: Arc<TuiContext>,
    /// Set true if the TUI thread should shut down.
    shutdown_flag: Arc<AtomicBool>,
    /// Tells the host process that `quit` was typed.
    shutdown_tx: watch::Sender<bool>,
}

impl TuiModule {
    pub fn new(ctx: TuiContext, shutdown_tx: watch::Sender<bool>) -> Self {
        Self {
            ctx: Arc::new(ctx),
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Spawn a thread that reads commands from stdin until `quit`, EOF, or
    /// `shutdown()`. Returns immediately.
    pub fn spawn_tui_thread(&self) -> thread::JoinHandle<()> {
        let ctx = self.ctx.clone();
        let shutdown_flag = self.shutdown_flag.clone();
        let shutdown_tx = self.shutdown_tx.clone();

        thread::spawn(move || {
            println!("Scoreboard console ready. Type 'help' for commands.");

            let stdin = std::io::stdin();
            let mut reader = BufReader::new(stdin);

            loop {
                print!("score> ");
                let _ = std::io::stdout().flush();

                let mut line = String::new();
                match reader.read_line(&mut line) {
                    Ok(0) => {
                        info!("Console input closed");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        eprintln!("Error reading from stdin: {}", e);
                        break;
                    }
                }

                if shutdown_flag.load(Ordering::SeqCst) {
                    break;
                }

                let (quit, output) = commands::dispatch(line.trim(), &ctx);
                if let Some(text) = output {
                    println!("{}", text.trim_end());
                }
                if quit {
                    shutdown_flag.store(true, Ordering::SeqCst);
                    let _ = shutdown_tx.send(true);
                    break;
                }
            }
        })
    }

    pub fn shutdown(&self) {
        self.shutdown_flag.store(true, Ordering::SeqCst);
    }
}
