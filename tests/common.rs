//! Test utilities & fixtures.
//! Fake host objects, a throwaway config/saves tree and a tiny HTTP stub for the API.
#![allow(dead_code)] // Each test binary uses a different subset.

use bytes::Bytes;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use weeklyworld::chat::ChatLine;
use weeklyworld::config::Paths;
use weeklyworld::host::{GameMode, PlayerHandle, WorldView};
use weeklyworld::remote::ApiSettings;

pub const NETHER_CHALLENGE: &str = r#"{
  "week": 1,
  "tasks": [{"type": "dimension", "content": "minecraft:the_nether"}],
  "restrictions": [{"type": "hardcore", "content": "true"}]
}"#;

pub const TWO_TASK_CHALLENGE: &str = r#"{
  "week": 7,
  "tasks": [
    {"type": "dimension", "content": "minecraft:the_nether"},
    {"type": "item", "content": "minecraft:blaze_rod"}
  ],
  "restrictions": [{"type": "hardcore", "content": "true"}]
}"#;

/// `config/` and `saves/` under a temp dir, with one world folder per name.
pub struct Fixture {
    pub tmp: tempfile::TempDir,
    pub paths: Paths,
}

impl Fixture {
    pub fn new(worlds: &[&str]) -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config = tmp.path().join("config");
        std::fs::create_dir_all(&config).unwrap();
        let paths = Paths::new(&config);
        std::fs::create_dir_all(&paths.saves_dir).unwrap();
        for w in worlds {
            std::fs::create_dir_all(paths.saves_dir.join(w)).unwrap();
        }
        Self { tmp, paths }
    }

    pub fn write_challenge(&self, json: &str) {
        std::fs::write(self.paths.objectives_file(), json).unwrap();
    }

    pub fn write_env(&self, api_base: &str) {
        let env = serde_json::json!({"api_base": api_base, "server_secret": "s3cret"});
        std::fs::write(self.paths.server_env_file(), env.to_string()).unwrap();
    }

    /// Save root the host reports for a world folder (`saves/<name>/.`).
    pub fn world_root(&self, name: &str) -> PathBuf {
        self.paths.saves_dir.join(name).join(".")
    }
}

/// Retry timing shrunk for tests.
pub fn fast_settings() -> ApiSettings {
    ApiSettings {
        retry_delay: Duration::from_millis(50),
        request_timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
        ..ApiSettings::default()
    }
}

pub struct FakeWorld {
    pub root: Option<PathBuf>,
    pub level: Option<String>,
    pub dimension: String,
    pub hardcore: bool,
    pub difficulty: String,
}

impl FakeWorld {
    pub fn at(root: impl AsRef<Path>, hardcore: bool) -> Self {
        Self {
            root: Some(root.as_ref().to_path_buf()),
            level: None,
            dimension: "minecraft:overworld".into(),
            hardcore,
            difficulty: "hard".into(),
        }
    }
}

impl WorldView for FakeWorld {
    fn save_root(&self) -> Option<PathBuf> {
        self.root.clone()
    }
    fn level_name(&self) -> Option<String> {
        self.level.clone()
    }
    fn dimension(&self) -> String {
        self.dimension.clone()
    }
    fn is_hardcore(&self) -> bool {
        self.hardcore
    }
    fn difficulty(&self) -> String {
        self.difficulty.clone()
    }
}

/// Player that records everything sent to it.
pub struct FakePlayer {
    pub uuid: String,
    pub permission: AtomicU8,
    pub mode: GameMode,
    pub world: FakeWorld,
    pub messages: Mutex<Vec<ChatLine>>,
    pub disconnected: Mutex<Option<ChatLine>>,
    pub payloads: Mutex<Vec<(String, Bytes)>>,
}

impl FakePlayer {
    pub fn new(uuid: &str, world: FakeWorld) -> Self {
        Self {
            uuid: uuid.to_string(),
            permission: AtomicU8::new(0),
            mode: GameMode::Survival,
            world,
            messages: Mutex::new(Vec::new()),
            disconnected: Mutex::new(None),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_permission(self, level: u8) -> Self {
        self.permission.store(level, Ordering::SeqCst);
        self
    }

    pub fn set_permission(&self, level: u8) {
        self.permission.store(level, Ordering::SeqCst);
    }

    pub fn texts(&self) -> Vec<String> {
        self.messages.lock().unwrap().iter().map(|l| l.text.clone()).collect()
    }

    pub fn count(&self, text: &str) -> usize {
        self.texts().iter().filter(|t| t.as_str() == text).count()
    }

    pub fn disconnect_reason(&self) -> Option<ChatLine> {
        self.disconnected.lock().unwrap().clone()
    }
}

impl PlayerHandle for FakePlayer {
    fn uuid(&self) -> String {
        self.uuid.clone()
    }
    fn name(&self) -> String {
        format!("player-{}", self.uuid)
    }
    fn permission_level(&self) -> u8 {
        self.permission.load(Ordering::SeqCst)
    }
    fn game_mode(&self) -> GameMode {
        self.mode
    }
    fn world(&self) -> &dyn WorldView {
        &self.world
    }
    fn send_message(&self, line: ChatLine) {
        self.messages.lock().unwrap().push(line);
    }
    fn disconnect(&self, reason: ChatLine) {
        *self.disconnected.lock().unwrap() = Some(reason);
    }
    fn send_payload(&self, channel: &str, payload: Bytes) {
        self.payloads.lock().unwrap().push((channel.to_string(), payload));
    }
}

/// Base URL nothing listens on.
pub fn refused_base() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Minimal HTTP/1.1 server answering by path prefix; unknown paths get 200.
pub struct StubServer {
    pub base: String,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub async fn start(routes: &[(&str, u16)]) -> Self {
        Self::start_inner(routes, false).await
    }

    /// Accepts connections but never answers.
    pub async fn silent() -> Self {
        Self::start_inner(&[], true).await
    }

    async fn start_inner(routes: &[(&str, u16)], silent: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let routes: Vec<(String, u16)> = routes.iter().map(|(p, s)| (p.to_string(), *s)).collect();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let routes = routes.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    if silent {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                        return;
                    }
                    let Some(request) = read_request(&mut socket).await else {
                        return;
                    };
                    let status = routes
                        .iter()
                        .find(|(prefix, _)| request.path.starts_with(prefix.as_str()))
                        .map(|(_, s)| *s)
                        .unwrap_or(200);
                    recorded.lock().unwrap().push(request);
                    let response = format!(
                        "HTTP/1.1 {} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                        status,
                        reason(status)
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        Self { base, requests }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path_prefix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.starts_with(path_prefix))
            .collect()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let mut headers = HashMap::new();
    for line in lines {
        if let Some((k, v)) = line.split_once(':') {
            headers.insert(k.trim().to_ascii_lowercase(), v.trim().to_string());
        }
    }

    let length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    while buf.len() < header_end + length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}
