//! NseClient against a local canned HTTP responder

use oi_core::{FetchError, NseClient, SnapshotProvider};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const CHAIN_BODY: &str = r#"{
    "records": {
        "underlyingValue": 22150.25,
        "data": [
            {
                "strikePrice": 22000,
                "expiryDate": "05-Dec-2024",
                "PE": {"strikePrice": 22000, "openInterest": 5100, "lastPrice": 31.5},
                "CE": {"strikePrice": 22000, "openInterest": 4200, "lastPrice": 180.0}
            },
            {
                "strikePrice": 22500,
                "expiryDate": "05-Dec-2024",
                "CE": {"strikePrice": 22500, "openInterest": 7000, "lastPrice": 12.0}
            }
        ]
    }
}"#;

/// Accept one connection, answer it with `status_line` and `body`, and
/// return the request head that was received.
async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        let _ = stream.shutdown().await;

        String::from_utf8_lossy(&head).into_owned()
    });

    (base_url, handle)
}

fn client(base_url: &str) -> NseClient {
    NseClient::new(base_url, "Chrome/117.0.0.0", Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_decodes_chain() {
    let (base_url, server) = serve_once("200 OK", CHAIN_BODY).await;

    let snapshot = client(&base_url).fetch("NIFTY").await.unwrap();
    let head = server.await.unwrap();

    assert_eq!(snapshot.underlying_value, 22150.25);
    assert_eq!(snapshot.entries.len(), 2);
    assert_eq!(snapshot.present_sides(), 3);
    assert_eq!(snapshot.entries[1].call.open_interest, 7000.0);

    assert!(head.starts_with("GET /api/option-chain-indices?symbol=NIFTY HTTP/1.1"));
    assert!(head.to_ascii_lowercase().contains("user-agent: chrome/117.0.0.0"));
}

#[tokio::test]
async fn test_non_200_status_is_an_error() {
    let (base_url, server) = serve_once("401 Unauthorized", "{}").await;

    let err = client(&base_url).fetch("BANKNIFTY").await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, FetchError::Status(401)));
}

#[tokio::test]
async fn test_blocked_empty_object_is_an_error() {
    let (base_url, server) = serve_once("200 OK", "{}").await;

    let err = client(&base_url).fetch("BANKNIFTY").await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn test_malformed_body_is_an_error() {
    let (base_url, server) = serve_once("200 OK", "{\"records\": [").await;

    let err = client(&base_url).fetch("BANKNIFTY").await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_a_request_error() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{}", addr))
        .fetch("BANKNIFTY")
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Request(_)));
    assert_eq!(err.kind(), "request");
}
