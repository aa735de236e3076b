// flyscore-server/src/control.rs
//
// Shares one DocumentServer between the binary and the console thread.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU16, Ordering};

use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tracing::info;

use flyscore_tui::ServerControl;

use crate::server::{DocumentServer, health_check};

pub struct SharedServer {
    server: Mutex<DocumentServer>,
    doc_root: PathBuf,
    port: AtomicU16,
    runtime_handle: Handle,
}

impl SharedServer {
    pub fn new(doc_root: &Path, runtime_handle: Handle) -> Self {
        Self {
            server: Mutex::new(DocumentServer::new()),
            doc_root: doc_root.to_path_buf(),
            port: AtomicU16::new(0),
            runtime_handle,
        }
    }

    pub async fn start(&self, preferred_port: u16) -> u16 {
        let mut server = self.server.lock().await;
        let port = server.start(&self.doc_root, preferred_port).await;
        self.port.store(port, Ordering::SeqCst);
        port
    }

    pub async fn stop(&self) {
        let mut server = self.server.lock().await;
        server.stop().await;
        self.port.store(0, Ordering::SeqCst);
    }

    /// Stops and starts again under one lock.
    pub async fn rebind(&self, preferred_port: u16) -> u16 {
        let mut server = self.server.lock().await;
        server.stop().await;
        self.port.store(0, Ordering::SeqCst);
        let port = server.start(&self.doc_root, preferred_port).await;
        self.port.store(port, Ordering::SeqCst);
        info!("Document server rebound: preferred {}, bound {}", preferred_port, port);
        port
    }
}

impl ServerControl for SharedServer {
    fn port(&self) -> u16 {
        self.port.load(Ordering::SeqCst)
    }

    fn restart(&self, preferred_port: u16) -> u16 {
        self.runtime_handle.block_on(self.rebind(preferred_port))
    }

    fn is_healthy(&self) -> bool {
        self.runtime_handle.block_on(health_check(self.port()))
    }
}
