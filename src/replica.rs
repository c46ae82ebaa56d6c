//! Replica-side replication: the handshake with the primary and the
//! command-stream apply loop.
//!
//! The stream arriving after PSYNC is parsed by an explicit two-phase state
//! machine over a rolling buffer: first the RDB snapshot bulk (whose blob
//! carries no trailing CRLF), then a plain sequence of RESP arrays. The
//! parser tolerates arbitrary TCP fragmentation and never re-processes a
//! byte; the count of command-stream bytes consumed feeds REPLCONF ACK.

use std::sync::Arc;

use bytes::{Buf, BytesMut};
use regex::Regex;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::commands::CommandHandler;
use crate::connection::write_to_stream;
use crate::pubsub::SubscriberWriter;
use crate::resp::{RespError, RespValue};
use crate::server::SharedState;
use crate::session::Session;

#[derive(Error, Debug)]
pub enum ReplicationError {
    #[error("I/O error: {0}")]
    Io(#[from] tokio::io::Error),
    #[error("connection to primary closed")]
    ConnectionClosed,
    #[error("unexpected response from primary: {0}")]
    UnexpectedResponse(String),
    #[error("RESP parse error: {0}")]
    Resp(#[from] RespError),
}

/// Performs the handshake and spawns the stream-apply task. Returns an
/// error when the handshake cannot be completed, which aborts server
/// startup.
pub async fn start_replication(
    mut stream: TcpStream,
    shared: SharedState,
) -> tokio::io::Result<()> {
    let listening_port = shared.server.read().await.port;
    let mut buffer = BytesMut::with_capacity(4096);

    handshake(&mut stream, &mut buffer, listening_port)
        .await
        .map_err(tokio::io::Error::other)?;

    info!("handshake with primary complete, entering command-stream mode");

    tokio::spawn(async move {
        handle_primary_stream(stream, shared, buffer).await;
    });

    Ok(())
}

/// The four-step handshake: PING, REPLCONF listening-port, REPLCONF capa,
/// PSYNC. Any unexpected reply aborts. Bytes read past the FULLRESYNC line
/// stay in `buffer`; they are the beginning of the RDB bulk.
async fn handshake(
    stream: &mut TcpStream,
    buffer: &mut BytesMut,
    listening_port: u32,
) -> Result<(), ReplicationError> {
    let reply = exchange(
        stream,
        buffer,
        RespValue::command_array("PING", &[]),
    )
    .await?;

    if reply != RespValue::SimpleString("PONG".to_string()) {
        return Err(ReplicationError::UnexpectedResponse(format!("{:?}", reply)));
    }

    let reply = exchange(
        stream,
        buffer,
        RespValue::command_array(
            "REPLCONF",
            &["listening-port".to_string(), listening_port.to_string()],
        ),
    )
    .await?;

    if reply != RespValue::SimpleString("OK".to_string()) {
        return Err(ReplicationError::UnexpectedResponse(format!("{:?}", reply)));
    }

    let reply = exchange(
        stream,
        buffer,
        RespValue::command_array("REPLCONF", &["capa".to_string(), "psync2".to_string()]),
    )
    .await?;

    if reply != RespValue::SimpleString("OK".to_string()) {
        return Err(ReplicationError::UnexpectedResponse(format!("{:?}", reply)));
    }

    let reply = exchange(
        stream,
        buffer,
        RespValue::command_array("PSYNC", &["?".to_string(), "-1".to_string()]),
    )
    .await?;

    validate_full_resync(&reply)
}

fn validate_full_resync(reply: &RespValue) -> Result<(), ReplicationError> {
    let RespValue::SimpleString(line) = reply else {
        return Err(ReplicationError::UnexpectedResponse(format!("{:?}", reply)));
    };

    let parts: Vec<&str> = line.split_whitespace().collect();

    let valid = parts.len() == 3
        && parts[0] == "FULLRESYNC"
        && is_valid_repl_id(parts[1])
        && parts[2].parse::<i64>().is_ok();

    if !valid {
        return Err(ReplicationError::UnexpectedResponse(line.clone()));
    }

    Ok(())
}

fn is_valid_repl_id(repl_id: &str) -> bool {
    let re = Regex::new(r"^[a-zA-Z0-9]{40}$").unwrap();
    re.is_match(repl_id)
}

async fn exchange(
    stream: &mut TcpStream,
    buffer: &mut BytesMut,
    command: RespValue,
) -> Result<RespValue, ReplicationError> {
    stream.write_all(command.encode().as_bytes()).await?;
    stream.flush().await?;

    read_frame(stream, buffer).await
}

async fn read_frame(
    stream: &mut TcpStream,
    buffer: &mut BytesMut,
) -> Result<RespValue, ReplicationError> {
    loop {
        if let Some((value, consumed)) = RespValue::decode(&buffer[..])? {
            buffer.advance(consumed);
            return Ok(value);
        }

        let mut chunk = [0u8; 1024];
        let read = stream.read(&mut chunk).await?;

        if read == 0 {
            return Err(ReplicationError::ConnectionClosed);
        }

        buffer.extend_from_slice(&chunk[..read]);
    }
}

/// Parse phase of the post-PSYNC byte stream.
#[derive(Debug, PartialEq)]
enum StreamPhase {
    /// Waiting for the `$<len>\r\n` header of the RDB bulk.
    AwaitingRdbHeader,
    /// Discarding the RDB payload; no trailing CRLF follows it.
    ConsumingRdb { remaining: usize },
    /// Ordinary RESP arrays from here on.
    CommandStream,
}

#[derive(Debug)]
pub struct MasterStreamParser {
    buffer: BytesMut,
    phase: StreamPhase,
    offset: u64,
}

impl MasterStreamParser {
    /// `initial` holds whatever the handshake read past the FULLRESYNC
    /// line.
    pub fn new(initial: BytesMut) -> Self {
        Self {
            buffer: initial,
            phase: StreamPhase::AwaitingRdbHeader,
            offset: 0,
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Command-stream bytes consumed so far; the RDB phase does not count.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Next complete command argument vector, or `None` when more bytes are
    /// needed. Non-command frames and malformed stretches are skipped.
    pub fn next_command(&mut self) -> Option<Vec<String>> {
        loop {
            match self.phase {
                StreamPhase::AwaitingRdbHeader => {
                    let header_end = self
                        .buffer
                        .windows(2)
                        .position(|window| window == b"\r\n")?;

                    let length = parse_rdb_header(&self.buffer[..header_end]);
                    self.buffer.advance(header_end + 2);

                    match length {
                        Some(length) => {
                            self.phase = StreamPhase::ConsumingRdb { remaining: length };
                        }
                        None => {
                            warn!("malformed RDB bulk header from primary, skipping line");
                        }
                    }
                }
                StreamPhase::ConsumingRdb { remaining } => {
                    let take = remaining.min(self.buffer.len());
                    self.buffer.advance(take);

                    if take == remaining {
                        debug!("RDB snapshot consumed");
                        self.phase = StreamPhase::CommandStream;
                    } else {
                        self.phase = StreamPhase::ConsumingRdb {
                            remaining: remaining - take,
                        };
                        return None;
                    }
                }
                StreamPhase::CommandStream => {
                    if self.buffer.is_empty() {
                        return None;
                    }

                    match RespValue::decode(&self.buffer[..]) {
                        Ok(Some((value, consumed))) => {
                            self.buffer.advance(consumed);
                            self.offset += consumed as u64;

                            if let Some(parts) = command_parts(value) {
                                return Some(parts);
                            }
                        }
                        Ok(None) => return None,
                        Err(_) => {
                            self.resynchronize();
                        }
                    }
                }
            }
        }
    }

    /// Drops bytes up to the next possible array marker so one corrupt
    /// frame cannot wedge the stream.
    fn resynchronize(&mut self) {
        let skip = match self.buffer[1..].iter().position(|&byte| byte == b'*') {
            Some(position) => position + 1,
            None => self.buffer.len(),
        };

        self.buffer.advance(skip);
        self.offset += skip as u64;
    }
}

fn parse_rdb_header(line: &[u8]) -> Option<usize> {
    if line.first() != Some(&b'$') {
        return None;
    }

    str::from_utf8(&line[1..]).ok()?.parse::<usize>().ok()
}

fn command_parts(value: RespValue) -> Option<Vec<String>> {
    let RespValue::Array(elements) = value else {
        return None;
    };

    let mut parts = Vec::with_capacity(elements.len());

    for element in elements {
        match element {
            RespValue::BulkString(s) => parts.push(s),
            _ => return None,
        }
    }

    if parts.is_empty() {
        return None;
    }

    Some(parts)
}

/// Reads the primary connection forever, applying replicated commands
/// silently. The only traffic sent back is REPLCONF ACK.
async fn handle_primary_stream(stream: TcpStream, shared: SharedState, leftover: BytesMut) {
    let client_address = stream
        .peer_addr()
        .map(|address| address.to_string())
        .unwrap_or_else(|_| "primary".to_string());

    let (mut reader, writer) = stream.into_split();
    let writer: SubscriberWriter = Arc::new(RwLock::new(writer));

    let mut parser = MasterStreamParser::new(leftover);
    let mut session = Session::new(client_address, Arc::clone(&writer));

    loop {
        while let Some(parts) = parser.next_command() {
            apply_replicated_command(parts, &shared, &mut session, &writer, parser.offset()).await;
        }

        if !read_more(&mut reader, &mut parser).await {
            info!("primary connection closed");
            break;
        }
    }
}

async fn read_more(reader: &mut OwnedReadHalf, parser: &mut MasterStreamParser) -> bool {
    let mut chunk = [0u8; 4096];

    match reader.read(&mut chunk).await {
        Ok(0) => false,
        Ok(read) => {
            parser.feed(&chunk[..read]);
            true
        }
        Err(e) => {
            warn!("error reading from primary: {}", e);
            false
        }
    }
}

async fn apply_replicated_command(
    parts: Vec<String>,
    shared: &SharedState,
    session: &mut Session,
    writer: &SubscriberWriter,
    offset: u64,
) {
    let Ok(command) = CommandHandler::from_parts(parts) else {
        return;
    };

    if command.name == "REPLCONF" {
        if is_getack(&command.arguments) {
            let ack = RespValue::command_array(
                "REPLCONF",
                &["ACK".to_string(), offset.to_string()],
            );

            if let Err(e) = write_to_stream(writer, ack.encode().as_bytes()).await {
                warn!("failed to send REPLCONF ACK: {}", e);
            }
        }
        // every other REPLCONF variant from the primary is ignored
        return;
    }

    if command.name == "PING" {
        return;
    }

    if !command.is_write_command() {
        debug!("ignoring replicated command {}", command.name);
        return;
    }

    if let Err(e) = command.execute(shared, session).await {
        warn!("failed to apply replicated {}: {}", command.name, e);
    }
}

fn is_getack(arguments: &[String]) -> bool {
    arguments.len() == 2 && arguments[0].eq_ignore_ascii_case("GETACK") && arguments[1] == "*"
}
