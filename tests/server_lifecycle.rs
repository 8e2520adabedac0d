//! Real listener: caller address from the socket peer, graceful shutdown.

use std::time::Duration;

use serde_json::{json, Value};
use tokio::net::TcpListener;

use skeleton_api::{AppConfig, HttpServer, Shutdown};

#[tokio::test]
async fn test_serves_over_tcp_and_shuts_down() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(AppConfig::default());
    let handle = tokio::spawn(server.run(listener, &shutdown));

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let base = format!("http://{addr}");

    let health: Value = client
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["data"]["status"], "UP");

    // The peer is 127.0.0.1, which the default allow list admits.
    let response = client
        .post(format!("{base}/api/holidays"))
        .json(&json!({ "holidayDate": "2025-06-06", "name": "Memorial Day" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    drop(client);
    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server should stop after trigger")
        .unwrap();
    assert!(result.is_ok());
}
