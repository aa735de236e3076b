// tests/document_server_tests.rs

use std::fs;
use std::net::{Ipv4Addr, TcpListener};

use flyscore_core::seeder::seed_if_needed;
use flyscore_server::server::{LEGACY_HEALTH_PATH, PORT_SCAN_WIDTH, bind_first_free};
use flyscore_server::{DocumentServer, health_check};
use flyscore_common::error::Error;

fn client() -> reqwest::Client {
    reqwest::Client::builder().build().unwrap()
}

async fn get(port: u16, path: &str) -> reqwest::Response {
    client()
        .get(format!("http://127.0.0.1:{port}{path}"))
        .send()
        .await
        .unwrap()
}

fn cache_control(res: &reqwest::Response) -> String {
    res.headers()
        .get("cache-control")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn serves_health_and_documents_with_cache_headers() {
    let dir = tempfile::tempdir().unwrap();
    let root = seed_if_needed(dir.path()).unwrap();
    fs::write(root.join("notes.txt"), "hello").unwrap();

    let mut server = DocumentServer::new();
    let port = server.start(&root, 0).await;
    assert_ne!(port, 0);
    assert!(server.is_running());
    assert_eq!(server.port(), port);

    let res = get(port, "/__health").await;
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(
        res.headers().get("content-type").unwrap().to_str().unwrap(),
        "text/plain; charset=utf-8"
    );
    assert_eq!(res.text().await.unwrap(), "ok");
    assert_eq!(get(port, LEGACY_HEALTH_PATH).await.status().as_u16(), 200);

    let res = get(port, "/plugin.json").await;
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(cache_control(&res), "no-store, must-revalidate");
    let doc: serde_json::Value = serde_json::from_str(&res.text().await.unwrap()).unwrap();
    assert_eq!(doc["custom_fields"][0]["label"], "Points");

    let res = get(port, "/overlay/script.js").await;
    assert_eq!(cache_control(&res), "no-store, must-revalidate");

    let res = get(port, "/notes.txt").await;
    assert_eq!(cache_control(&res), "no-cache");
    assert_eq!(res.text().await.unwrap(), "hello");

    let res = get(port, "/overlay/").await;
    assert_eq!(res.status().as_u16(), 200);
    assert!(res.text().await.unwrap().contains("script.js"));

    assert_eq!(get(port, "/missing.png").await.status().as_u16(), 404);

    server.stop().await;
}

#[tokio::test]
async fn file_changes_are_visible_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let root = seed_if_needed(dir.path()).unwrap();
    let mut server = DocumentServer::new();
    let port = server.start(&root, 0).await;

    fs::write(root.join("plugin.json"), r#"{"version":4,"swap_sides":true}"#).unwrap();
    let body = get(port, "/plugin.json").await.text().await.unwrap();
    assert!(body.contains("\"swap_sides\":true"));

    server.stop().await;
}

#[tokio::test]
async fn start_and_stop_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = DocumentServer::new();

    server.stop().await;
    assert!(!server.is_running());

    let port = server.start(dir.path(), 0).await;
    assert_eq!(server.start(dir.path(), 0).await, port);
    assert!(health_check(port).await);

    server.stop().await;
    server.stop().await;
    assert!(!server.is_running());
    assert_eq!(server.port(), 0);
    assert!(!health_check(port).await);
    assert!(!health_check(0).await);
}

#[tokio::test]
async fn busy_preferred_port_falls_through_to_the_next() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let busy = blocker.local_addr().unwrap().port();

    let mut server = DocumentServer::new();
    let port = server.start(dir.path(), busy).await;
    assert_ne!(port, busy);
    assert!(port > busy && port < busy + PORT_SCAN_WIDTH, "got {port} for preferred {busy}");
    assert!(health_check(port).await);

    server.stop().await;
    drop(blocker);
}

#[tokio::test]
async fn exhausted_range_reports_bind_failure() {
    // Hold every port in a window so nothing in it can be bound on either host.
    let (start, held) = loop {
        let first = TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0)).unwrap();
        let base = first.local_addr().unwrap().port();
        if base > u16::MAX - PORT_SCAN_WIDTH {
            continue;
        }
        let mut window = vec![first];
        let ok = (1..PORT_SCAN_WIDTH).all(|off| match TcpListener::bind((Ipv4Addr::UNSPECIFIED, base + off)) {
            Ok(l) => {
                window.push(l);
                true
            }
            Err(_) => false,
        });
        if ok {
            break (base, window);
        }
    };

    match bind_first_free(start) {
        Err(Error::BindFailure { start: s, end }) => {
            assert_eq!(s, start);
            assert_eq!(end, start + PORT_SCAN_WIDTH - 1);
        }
        other => panic!("expected BindFailure, got {:?}", other.map(|(_, a)| a)),
    }

    let dir = tempfile::tempdir().unwrap();
    let mut server = DocumentServer::new();
    assert_eq!(server.start(dir.path(), start).await, 0);
    assert!(!server.is_running());
    drop(held);
}
