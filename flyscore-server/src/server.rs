// flyscore-server/src/server.rs
//
// Static HTTP server for the document root. It only ever reads files; the
// overlay polls plugin.json through it while controllers rewrite that file.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener};
use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_server::Handle;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use flyscore_common::error::Error;

pub const HEALTH_PATH: &str = "/__health";
/// Older overlays and the settings dialog probe this path.
pub const LEGACY_HEALTH_PATH: &str = "/__ow/health";

/// How many consecutive ports are tried on each host.
pub const PORT_SCAN_WIDTH: u16 = 10;

const BIND_HOSTS: [Ipv4Addr; 2] = [Ipv4Addr::LOCALHOST, Ipv4Addr::UNSPECIFIED];

const SELF_TEST_ATTEMPTS: u32 = 10;
const SELF_TEST_INTERVAL: Duration = Duration::from_millis(100);
const PROBE_TIMEOUT: Duration = Duration::from_millis(200);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

pub struct DocumentServer {
    port: u16,
    doc_root: Option<PathBuf>,
    handle: Option<Handle>,
    server_task: Option<JoinHandle<()>>,
}

impl Default for DocumentServer {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentServer {
    pub fn new() -> Self {
        Self {
            port: 0,
            doc_root: None,
            handle: None,
            server_task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.server_task.is_some()
    }

    /// Bound port, or 0 when stopped.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn doc_root(&self) -> Option<&Path> {
        self.doc_root.as_deref()
    }

    /// Serves `doc_root` on the first free port starting at `preferred_port`
    /// and returns it, or 0 if nothing could be bound. Calling it again
    /// while running returns the current port and changes nothing.
    pub async fn start(&mut self, doc_root: &Path, preferred_port: u16) -> u16 {
        if self.is_running() {
            return self.port;
        }

        let doc_root = std::path::absolute(doc_root).unwrap_or_else(|_| doc_root.to_path_buf());
        info!("Document server root: {}", doc_root.display());

        let (listener, addr) = match bind_first_free(preferred_port) {
            Ok(bound) => bound,
            Err(e) => {
                warn!("Document server not started: {}", e);
                return 0;
            }
        };

        let app = build_router(&doc_root);
        let handle = Handle::new();
        let server = axum_server::from_tcp(listener)
            .handle(handle.clone())
            .serve(app.into_make_service());

        let join = tokio::spawn(async move {
            info!("Document server START on http://{}", addr);
            if let Err(e) = server.await {
                error!("Document server error: {}", e);
            }
            info!("Document server LOOP ended (port {})", addr.port());
        });

        self.port = addr.port();
        self.doc_root = Some(doc_root);
        self.handle = Some(handle);
        self.server_task = Some(join);

        if self_test(self.port).await {
            info!("Self-test OK on :{}", self.port);
        } else {
            warn!("Self-test could not reach {} on :{}", HEALTH_PATH, self.port);
        }
        self.port
    }

    /// Shuts the server down and waits for it to finish. No-op when stopped.
    pub async fn stop(&mut self) {
        let Some(join) = self.server_task.take() else {
            return;
        };
        info!("Document server STOP requested (port {})", self.port);
        if let Some(handle) = self.handle.take() {
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
        if let Err(e) = join.await {
            error!("Document server task failed: {}", e);
        }
        self.port = 0;
        self.doc_root = None;
    }
}

/// Tries `preferred..preferred+10` on 127.0.0.1, then the same range on
/// 0.0.0.0. Port 0 asks the OS for any free port on 127.0.0.1.
pub fn bind_first_free(preferred_port: u16) -> Result<(TcpListener, SocketAddr), Error> {
    if preferred_port == 0 {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
        return finish_bind(listener);
    }

    let last = preferred_port.saturating_add(PORT_SCAN_WIDTH - 1);
    for host in BIND_HOSTS {
        for port in preferred_port..=last {
            match TcpListener::bind(SocketAddr::new(IpAddr::V4(host), port)) {
                Ok(listener) => return finish_bind(listener),
                Err(e) => debug!("Could not bind {}:{}: {}", host, port, e),
            }
        }
    }
    Err(Error::BindFailure {
        start: preferred_port,
        end: last,
    })
}

fn finish_bind(listener: TcpListener) -> Result<(TcpListener, SocketAddr), Error> {
    listener.set_nonblocking(true)?;
    let addr = listener.local_addr()?;
    Ok((listener, addr))
}

pub fn build_router(doc_root: &Path) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health))
        .route(LEGACY_HEALTH_PATH, get(health))
        .fallback_service(ServeDir::new(doc_root))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(cache_headers)),
        )
}

async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "ok",
    )
}

/// Scripts and the document must never be cached; everything else is
/// revalidated.
async fn cache_headers(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    let mut res = next.run(req).await;
    let value = if path.ends_with(".js") || path.ends_with(".json") {
        "no-store, must-revalidate"
    } else {
        "no-cache"
    };
    res.headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static(value));
    if res.status().is_client_error() || res.status().is_server_error() {
        debug!("{} for {}", res.status(), path);
    }
    res
}

fn probe_client() -> Result<reqwest::Client, Error> {
    Ok(reqwest::Client::builder()
        .timeout(PROBE_TIMEOUT)
        .connect_timeout(PROBE_TIMEOUT)
        .pool_max_idle_per_host(0)
        .build()?)
}

async fn probe(client: &reqwest::Client, port: u16) -> Result<bool, Error> {
    let url = format!("http://127.0.0.1:{}{}", port, HEALTH_PATH);
    let res = client.get(url).send().await?;
    Ok(res.status().as_u16() == 200)
}

/// One probe of the health endpoint on 127.0.0.1, as a status indicator
/// would do it.
pub async fn health_check(port: u16) -> bool {
    if port == 0 {
        return false;
    }
    match probe_client() {
        Ok(client) => probe(&client, port).await.unwrap_or(false),
        Err(e) => {
            warn!("Could not build health probe client: {}", e);
            false
        }
    }
}

async fn self_test(port: u16) -> bool {
    let client = match probe_client() {
        Ok(c) => c,
        Err(e) => {
            warn!("Could not build self-test client: {}", e);
            return false;
        }
    };
    for attempt in 1..=SELF_TEST_ATTEMPTS {
        tokio::time::sleep(SELF_TEST_INTERVAL).await;
        match probe(&client, port).await {
            Ok(true) => return true,
            Ok(false) => debug!("Self-test attempt {} got a non-200 answer", attempt),
            Err(e) => debug!("Self-test attempt {} failed: {}", attempt, e),
        }
    }
    false
}
