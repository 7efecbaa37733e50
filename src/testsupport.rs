//! In-process HTTP fixture for exercising the client against canned
//! responses. Serves plain HTTP/1.1 over a loopback listener; just enough
//! for request/response tests, not a general server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A canned HTTP response for a single path.
#[derive(Debug, Clone)]
pub(crate) struct CannedResponse {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl CannedResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
        }
    }

    /// Delay before responding (for timeout tests).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// One-shot HTTP server bound to an ephemeral loopback port.
///
/// Unknown paths get a 404 with an empty JSON body. Requests are recorded
/// per path so tests can assert on hit counts and submitted bodies.
pub(crate) struct TestServer {
    pub base_url: String,
    hits: Arc<Mutex<HashMap<String, Vec<String>>>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(routes: HashMap<String, CannedResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        let routes = Arc::new(routes);
        let hits: Arc<Mutex<HashMap<String, Vec<String>>>> = Arc::new(Mutex::new(HashMap::new()));

        let hits_task = hits.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let routes = routes.clone();
                let hits = hits_task.clone();
                tokio::spawn(async move {
                    let raw = read_request(&mut socket).await;
                    let path = raw
                        .split_whitespace()
                        .nth(1)
                        .unwrap_or("/")
                        .to_string();

                    hits.lock().unwrap().entry(path.clone()).or_default().push(raw);

                    let response = routes.get(&path).cloned().unwrap_or_else(|| {
                        CannedResponse::json(404, serde_json::json!({}))
                    });
                    if let Some(delay) = response.delay {
                        tokio::time::sleep(delay).await;
                    }

                    let message = format!(
                        "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        response.status,
                        response.body.len(),
                        response.body
                    );
                    let _ = socket.write_all(message.as_bytes()).await;
                });
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            hits,
            handle,
        }
    }

    /// Number of requests received for a path.
    pub fn hit_count(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).map_or(0, Vec::len)
    }

    /// Raw text of the most recent request to a path.
    pub fn last_request(&self, path: &str) -> Option<String> {
        self.hits
            .lock()
            .unwrap()
            .get(path)
            .and_then(|requests| requests.last().cloned())
    }
}

/// Read one HTTP request: headers plus a Content-Length body if present.
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let Ok(n) = socket.read(&mut buf).await else {
            break;
        };
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())?
                })
                .unwrap_or(0);
            if data.len() >= header_end + 4 + content_length {
                break;
            }
        }
        if data.len() > 1024 * 1024 {
            break;
        }
    }
    String::from_utf8_lossy(&data).to_string()
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
