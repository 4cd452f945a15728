//! Shared fixtures for tests that talk to stubbed LINE and completion servers.

use std::net::TcpListener as StdTcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Client;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::web::AppState;
use crate::Config;

pub const SECRET: &str = "test-channel-secret";

/// Config pointing both collaborators at the given URLs.
pub fn test_config(completion_url: &str, line_base_url: &str) -> Config {
    let mut config = Config::from_lookup(|name| {
        let value = match name {
            "CHANNEL_ACCESS_TOKEN" => Some("test-access-token"),
            "CHANNEL_SECRET" => Some(SECRET),
            "COMPLETION_URL" => Some(completion_url),
            "LINE_API_BASE_URL" => Some(line_base_url),
            _ => None,
        };
        value.map(str::to_string)
    })
    .expect("test config");

    config.completion_timeout = Duration::from_secs(1);
    config.line_timeout = Duration::from_secs(1);
    config
}

pub fn test_state(completion_url: &str, line_base_url: &str) -> AppState {
    AppState::new(test_config(completion_url, line_base_url), Client::new())
}

/// Base URL of a local port nothing is listening on.
pub fn closed_port_url() -> String {
    let listener = StdTcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}", addr)
}

/// Base URL of a server that accepts connections and never answers.
pub async fn silent_server_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{}", addr)
}

/// Base URL of a server that reads the first request and then hangs up
/// without answering. Later requests get `200 {}`.
///
/// Every request it reads, headers and body, is recorded in order.
pub async fn drop_first_server() -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();

    tokio::spawn(async move {
        let mut first = true;
        while let Ok((mut socket, _)) = listener.accept().await {
            let Some(request) = read_request(&mut socket).await else {
                continue;
            };
            recorded.lock().expect("request log").push(request);

            if first {
                first = false;
                drop(socket);
                continue;
            }

            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}",
                )
                .await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{}", addr), requests)
}

async fn read_request(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);

        if buf.len() >= header_end + 4 + content_length {
            return Some(String::from_utf8_lossy(&buf).into_owned());
        }
    }
}
