//! Local HTTP listener that answers every request with one canned reply.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use super::client::DpsClient;
use crate::config::ApiConfig;

pub struct TestServer {
  url: String,
}

impl TestServer {
  pub async fn reply(status: u16, body: &str) -> Self {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = body.to_string();

    tokio::spawn(async move {
      while let Ok((stream, _)) = listener.accept().await {
        let body = body.clone();
        tokio::spawn(async move {
          let _ = respond(stream, status, &body).await;
        });
      }
    });

    Self {
      url: format!("http://{}/api.php", addr),
    }
  }

  pub fn client(&self) -> DpsClient {
    DpsClient::new(&ApiConfig {
      url: self.url.clone(),
      timeout_secs: Some(5),
    })
    .unwrap()
  }
}

async fn respond(mut stream: TcpStream, status: u16, body: &str) -> std::io::Result<()> {
  read_request(&mut stream).await?;

  let phrase = if status == 200 { "OK" } else { "Error" };
  let response = format!(
    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
    status,
    phrase,
    body.len(),
    body
  );
  stream.write_all(response.as_bytes()).await?;
  stream.shutdown().await
}

/// Read the head and any `Content-Length` body before answering.
async fn read_request(stream: &mut TcpStream) -> std::io::Result<()> {
  let mut buf = Vec::new();
  let mut chunk = [0u8; 1024];
  loop {
    let n = stream.read(&mut chunk).await?;
    if n == 0 {
      return Ok(());
    }
    buf.extend_from_slice(&chunk[..n]);

    if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
      let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
      let length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
      if buf.len() >= end + 4 + length {
        return Ok(());
      }
    }
  }
}
