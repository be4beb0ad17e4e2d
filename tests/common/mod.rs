//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use instance_node::config::NodeConfig;
use instance_node::http::{AppState, HttpServer};
use instance_node::lifecycle::Shutdown;
use instance_node::metadata::MetadataClient;
use instance_node::node::NodeState;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A parsed request as seen by a mock backend.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl MockRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Start a programmable mock backend on an ephemeral port.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(MockRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(request).await;
                        let status_text = status_line(status);

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Status line for a mock response; codes without a known phrase keep their
/// number and get a generic reason.
pub fn status_line(status: u16) -> String {
    let reason = match status {
        200 => "OK",
        302 => "Found",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    };
    format!("{} {}", status, reason)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<MockRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let text = String::from_utf8_lossy(&buf);
    let mut lines = text.split("\r\n");
    let path = lines.next()?.split_whitespace().nth(1)?.to_string();
    let headers = lines
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    Some(MockRequest { path, headers })
}

/// Start a metadata service answering like a GCE instance.
pub async fn start_mock_metadata() -> SocketAddr {
    start_programmable_backend(|request: MockRequest| async move {
        if request.header("Metadata-Flavor") != Some("Google") {
            return (403, "Missing Metadata-Flavor header".into());
        }
        match request.path.as_str() {
            "/computeMetadata/v1/instance/zone" => {
                (200, "projects/123456/zones/europe-west1-b".into())
            }
            "/computeMetadata/v1/instance/attributes/instance-template" => (
                200,
                "projects/123456/global/instanceTemplates/web-template-v3".into(),
            ),
            _ => (404, "not found".into()),
        }
    })
    .await
}

pub fn metadata_client(addr: SocketAddr) -> MetadataClient {
    MetadataClient::with_base_url(
        &format!("http://{}/computeMetadata/v1/instance", addr),
        Duration::from_secs(2),
    )
    .unwrap()
}

/// A node served on an ephemeral port; shuts down on drop.
pub struct TestNode {
    pub addr: SocketAddr,
    pub state: AppState,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestNode {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("node unreachable")
    }
}

impl Drop for TestNode {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn spawn_node(metadata: MetadataClient) -> TestNode {
    let mut config = NodeConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.load.poll_interval_ms = 10;

    let node = NodeState::new(&config.load).unwrap();
    let state = AppState {
        node,
        metadata: Arc::new(metadata),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config, state.clone());
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap();

    TestNode {
        addr,
        state,
        client,
        shutdown,
    }
}
