//! Server configuration and the accept loop.
//!
//! Parses the command-line surface (`--port`, `--dir`, `--dbfilename`,
//! `--replicaof`), decides the replication role, generates the replication
//! id, and runs the listener that spawns one task per client connection. A
//! replica additionally opens the primary connection and starts the
//! replication stream before accepting clients.

use std::sync::Arc;

use rand::distr::{Alphanumeric, SampleString};
use regex::Regex;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::connection::handle_client_connection;
use crate::key_value_store::KeyValueStore;
use crate::pubsub::PubSubRegistry;
use crate::replica;
use crate::replication::ReplicaRegistry;

/// Errors that can occur during command-line argument parsing.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum CliError {
    #[error("invalid command line flag")]
    InvalidCommandLineFlag,
    #[error("invalid port flag value")]
    InvalidPortFlagValue,
    #[error("invalid primary address")]
    InvalidPrimaryAddress,
    #[error("invalid primary port")]
    InvalidPrimaryPort,
}

/// Replication role of this server instance.
#[derive(Debug, PartialEq, Clone)]
pub enum ServerRole {
    /// Accepts writes and streams them to attached replicas.
    Primary,
    /// Applies the command stream of the primary at (host, port).
    Replica { host: String, port: u32 },
}

impl ServerRole {
    /// Role name in the wire vocabulary (INFO reports `master`/`slave`).
    pub fn as_string(&self) -> &str {
        match self {
            ServerRole::Primary => "master",
            ServerRole::Replica { .. } => "slave",
        }
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, ServerRole::Primary)
    }
}

/// Configuration and replication identity of a server instance.
#[derive(Debug, PartialEq, Clone)]
pub struct RedisServer {
    pub port: u32,
    pub role: ServerRole,
    /// 40-character replication id, generated once and stable for the
    /// process lifetime.
    pub repl_id: String,
    pub repl_offset: usize,
    /// Directory reported by `CONFIG GET dir` and searched for the RDB file.
    pub rdb_directory: String,
    /// File name reported by `CONFIG GET dbfilename`.
    pub rdb_filename: String,
}

/// The shared registries every connection task works against. The store,
/// pub/sub registry and replica list each sit behind their own
/// reader/writer lock so contention on one does not serialize the others.
#[derive(Clone)]
pub struct SharedState {
    pub server: Arc<RwLock<RedisServer>>,
    pub store: Arc<RwLock<KeyValueStore>>,
    pub pub_sub: Arc<RwLock<PubSubRegistry>>,
    pub replicas: Arc<RwLock<ReplicaRegistry>>,
}

impl SharedState {
    pub fn new(server: RedisServer) -> Self {
        Self {
            server: Arc::new(RwLock::new(server)),
            store: Arc::new(RwLock::new(KeyValueStore::new())),
            pub_sub: Arc::new(RwLock::new(PubSubRegistry::new())),
            replicas: Arc::new(RwLock::new(ReplicaRegistry::new())),
        }
    }
}

impl RedisServer {
    /// Builds a server from command-line arguments.
    ///
    /// Supported flags: `--port <port>`, `--dir <path>`,
    /// `--dbfilename <name>`, `--replicaof "<host> <port>"`. Defaults:
    /// port 6379, dir `.`, dbfilename `dump.rdb`, primary role.
    pub fn new<I: IntoIterator<Item = String>>(command_line_args: I) -> Result<Self, CliError> {
        let mut iter = command_line_args.into_iter().skip(1);
        let mut port: Option<u32> = None;
        let mut role: Option<ServerRole> = None;
        let mut rdb_directory: Option<String> = None;
        let mut rdb_filename: Option<String> = None;

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--port" => {
                    let Some(port_str) = iter.next() else {
                        return Err(CliError::InvalidCommandLineFlag);
                    };

                    port = Some(validate_port(&port_str, CliError::InvalidPortFlagValue)?);
                }
                "--dir" => {
                    let Some(dir) = iter.next() else {
                        return Err(CliError::InvalidCommandLineFlag);
                    };

                    rdb_directory = Some(dir);
                }
                "--dbfilename" => {
                    let Some(filename) = iter.next() else {
                        return Err(CliError::InvalidCommandLineFlag);
                    };

                    rdb_filename = Some(filename);
                }
                "--replicaof" => {
                    let Some(primary_address) = iter.next() else {
                        return Err(CliError::InvalidCommandLineFlag);
                    };

                    let (host, port) = validate_primary_address(&primary_address)?;

                    role = Some(ServerRole::Replica { host, port });
                }
                _ => return Err(CliError::InvalidCommandLineFlag),
            }
        }

        Ok(RedisServer {
            port: port.unwrap_or(6379),
            role: role.unwrap_or(ServerRole::Primary),
            repl_id: Alphanumeric.sample_string(&mut rand::rng(), 40),
            repl_offset: 0,
            rdb_directory: rdb_directory.unwrap_or_else(|| ".".to_string()),
            rdb_filename: rdb_filename.unwrap_or_else(|| "dump.rdb".to_string()),
        })
    }

    /// Runs the server until the process is terminated.
    ///
    /// A replica first connects to its primary, performs the handshake and
    /// spawns the stream-apply task; both roles then accept client
    /// connections. Returns an error (and lets the caller exit non-zero)
    /// when the listener cannot bind or the primary is unreachable.
    pub async fn run(self) -> tokio::io::Result<()> {
        let listen_port = self.port;
        let role = self.role.clone();
        let shared = SharedState::new(self);

        if let ServerRole::Replica { host, port } = role {
            let stream = TcpStream::connect(format!("{}:{}", host, port)).await?;
            replica::start_replication(stream, shared.clone()).await?;
        }

        let listener = TcpListener::bind(format!("127.0.0.1:{}", listen_port)).await?;
        info!("listening on port {}", listen_port);

        loop {
            match listener.accept().await {
                Ok((stream, client_address)) => {
                    let shared = shared.clone();

                    tokio::spawn(async move {
                        handle_client_connection(stream, shared, client_address.to_string()).await;
                    });
                }
                Err(e) => {
                    error!("failed to accept connection: {}", e);
                }
            }
        }
    }
}

fn validate_port(port: &str, error: CliError) -> Result<u32, CliError> {
    let port_number = port.parse::<u32>().map_err(|_| error.clone())?;

    if !(1..=65535).contains(&port_number) {
        return Err(error);
    }

    Ok(port_number)
}

/// Parses a `--replicaof` value of the form `"<host> <port>"` where host is
/// an IPv4 address or hostname.
fn validate_primary_address(primary_address: &str) -> Result<(String, u32), CliError> {
    let ipv4_regex = Regex::new(r"^(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})$").unwrap();
    let hostname_regex = Regex::new(r"^[a-zA-Z0-9\-\.]+$").unwrap();

    let split_address = primary_address.split_whitespace().collect::<Vec<&str>>();

    if split_address.len() != 2 {
        return Err(CliError::InvalidPrimaryAddress);
    }

    let host = split_address[0];

    let valid_host = if let Some(caps) = ipv4_regex.captures(host) {
        caps.iter().skip(1).all(|octet| {
            octet
                .map(|m| m.as_str().parse::<u16>().map(|v| v <= 255).unwrap_or(false))
                .unwrap_or(false)
        })
    } else {
        hostname_regex.is_match(host)
    };

    if !valid_host {
        return Err(CliError::InvalidPrimaryAddress);
    }

    let port = validate_port(split_address[1], CliError::InvalidPrimaryPort)?;

    Ok((host.to_string(), port))
}
