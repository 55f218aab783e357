//! Shared helpers for integration tests.

use brandgen::config::{Config, NotificationConfig, VariantSpec};
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Default config pointed at `output`, without a logo.
#[allow(dead_code)]
pub fn config_for(output: &Path, notification: NotificationConfig) -> Config {
    let mut config = Config::default();
    config.brand.logo_path = None;
    config.storage.output_directory = output.to_path_buf();
    config.image_variants.sizes = VariantSpec::defaults();
    config.notification = notification;
    config
}

fn content_length(head: &str) -> usize {
    head.lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.trim().eq_ignore_ascii_case("content-length") {
                value.trim().parse().ok()
            } else {
                None
            }
        })
        .unwrap_or(0)
}

/// Accepts one connection, answers with `status_line` and `body`, and returns the raw request.
#[allow(dead_code)]
pub async fn serve_once(status_line: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = Vec::new();
        let mut buf = [0u8; 8192];
        loop {
            let n = socket.read(&mut buf).await.expect("read request");
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request);
            if let Some((head, rest)) = text.split_once("\r\n\r\n")
                && rest.len() >= content_length(head)
            {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket
            .write_all(response.as_bytes())
            .await
            .expect("write response");
        let _ = socket.shutdown().await;
        String::from_utf8_lossy(&request).to_string()
    });
    (format!("http://{addr}"), handle)
}

/// The body of a raw HTTP request.
#[allow(dead_code)]
pub fn request_body(request: &str) -> &str {
    request
        .split_once("\r\n\r\n")
        .map(|(_, body)| body)
        .unwrap_or_default()
}
