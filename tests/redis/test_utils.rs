use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;

use rudis::commands::{CommandHandler, ConnectionReply, dispatch_command};
use rudis::connection::handle_client_connection;
use rudis::resp::RespValue;
use rudis::server::{RedisServer, SharedState};
use rudis::session::Session;

/// Shared registries plus helpers for driving the dispatcher and executor
/// the way the connection loop does.
pub struct TestEnv {
    pub shared: SharedState,
}

/// A session bound to one end of a real socket pair, so pub/sub pushes and
/// replication fan-out can be observed from `peer`.
pub struct TestClient {
    pub session: Session,
    pub peer: TcpStream,
}

impl TestEnv {
    pub fn new_primary() -> Self {
        let server = RedisServer::new(vec!["rudis".to_string()]).unwrap();
        Self {
            shared: SharedState::new(server),
        }
    }

    pub fn new_replica() -> Self {
        let server = RedisServer::new(vec![
            "rudis".to_string(),
            "--replicaof".to_string(),
            "127.0.0.1 6399".to_string(),
        ])
        .unwrap();
        Self {
            shared: SharedState::new(server),
        }
    }

    /// Builds a session whose writer half talks to a loopback socket; the
    /// other end is returned for inspection.
    pub async fn client(&self, tag: u16) -> TestClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let peer = TcpStream::connect(address).await.unwrap();
        let (accepted, _) = listener.accept().await.unwrap();
        let (_, writer) = accepted.into_split();

        TestClient {
            session: Session::new(
                format!("127.0.0.1:{}", tag),
                Arc::new(RwLock::new(writer)),
            ),
            peer,
        }
    }

    /// Spawns the real connection loop on the accepted end of a loopback
    /// socket and returns the client end, for wire-level tests.
    pub async fn connect(&self) -> TcpStream {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let client = TcpStream::connect(address).await.unwrap();
        let (accepted, peer_address) = listener.accept().await.unwrap();

        let shared = self.shared.clone();

        tokio::spawn(async move {
            handle_client_connection(accepted, shared, peer_address.to_string()).await;
        });

        client
    }

    /// Runs one command through the session state machine and executor,
    /// returning the encoded reply (for PSYNC, the FULLRESYNC header).
    pub async fn exec(&self, session: &mut Session, parts: &[&str]) -> String {
        let command =
            CommandHandler::from_parts(parts.iter().map(|s| s.to_string()).collect()).unwrap();

        let plan = dispatch_command(session, command);

        match plan.resolve(&self.shared, session).await {
            ConnectionReply::Payload(payload) => payload,
            ConnectionReply::FullResync { header } => header,
        }
    }
}

/// Encodes and sends one command the way a RESP client would.
pub async fn send_command(stream: &mut TcpStream, parts: &[&str]) {
    let arguments: Vec<String> = parts[1..].iter().map(|s| s.to_string()).collect();
    let frame = RespValue::command_array(parts[0], &arguments).encode();

    stream.write_all(frame.as_bytes()).await.unwrap();
    stream.flush().await.unwrap();
}

/// Sends raw bytes, for malformed-input cases.
pub async fn send_raw(stream: &mut TcpStream, bytes: &[u8]) {
    stream.write_all(bytes).await.unwrap();
    stream.flush().await.unwrap();
}

/// Reads whatever is currently available on the socket, with a timeout so
/// a missing push fails the test instead of hanging it.
pub async fn read_available(stream: &mut TcpStream) -> String {
    let mut chunk = [0u8; 4096];

    let read = tokio::time::timeout(Duration::from_secs(1), stream.read(&mut chunk))
        .await
        .expect("timed out waiting for socket data")
        .expect("socket read failed");

    String::from_utf8_lossy(&chunk[..read]).to_string()
}

/// Reads until at least `total` bytes have arrived, tolerating any packet
/// boundaries in between.
pub async fn read_exact_bytes(stream: &mut TcpStream, total: usize) -> Vec<u8> {
    let mut collected = Vec::with_capacity(total);

    while collected.len() < total {
        let mut chunk = [0u8; 4096];

        let read = tokio::time::timeout(Duration::from_secs(1), stream.read(&mut chunk))
            .await
            .expect("timed out waiting for socket data")
            .expect("socket read failed");

        if read == 0 {
            break;
        }

        collected.extend_from_slice(&chunk[..read]);
    }

    collected
}

pub fn bulk(value: &str) -> String {
    format!("${}\r\n{}\r\n", value.len(), value)
}

pub fn simple(value: &str) -> String {
    format!("+{}\r\n", value)
}

pub fn integer(value: i64) -> String {
    format!(":{}\r\n", value)
}

pub fn null() -> String {
    "$-1\r\n".to_string()
}

pub fn bulk_array(items: &[&str]) -> String {
    let mut encoded = format!("*{}\r\n", items.len());
    for item in items {
        encoded.push_str(&bulk(item));
    }
    encoded
}
