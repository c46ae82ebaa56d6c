//! Read-side plumbing shared by the client connection loop.

use bytes::BytesMut;
use thiserror::Error;
use tokio::io::AsyncReadExt;

use crate::resp::{RespError, RespValue};

#[derive(Error, Debug, PartialEq)]
pub enum CommandReadError {
    #[error("I/O error: {0}")]
    IoError(String),
    #[error("connection closed")]
    ConnectionClosed,
    #[error("RESP parse error")]
    RespParseError(#[from] RespError),
}

impl CommandReadError {
    pub fn as_string(&self) -> String {
        match self {
            CommandReadError::RespParseError(error) => error.as_string(),
            other => RespValue::Error(format!("ERR {}", other)).encode(),
        }
    }
}

/// Reads one chunk from the socket into the rolling buffer and drains every
/// complete frame from it. A partial frame stays buffered for the next
/// call. On a protocol error the buffer is discarded so the connection can
/// reply with an error and keep reading from a clean slate.
pub async fn read_frames<R>(
    reader: &mut R,
    buffer: &mut BytesMut,
) -> Result<Vec<RespValue>, CommandReadError>
where
    R: AsyncReadExt + Unpin,
{
    let mut chunk = [0u8; 1024];

    let read = reader
        .read(&mut chunk)
        .await
        .map_err(|e| CommandReadError::IoError(e.to_string()))?;

    if read == 0 {
        return Err(CommandReadError::ConnectionClosed);
    }

    buffer.extend_from_slice(&chunk[..read]);

    match RespValue::parse(buffer) {
        Ok(values) => Ok(values),
        Err(error) => {
            buffer.clear();
            Err(CommandReadError::RespParseError(error))
        }
    }
}
