//! RESP (REdis Serialization Protocol) framing.
//!
//! The decoder is streaming: it works on a rolling `BytesMut` fed by the
//! connection read loop, consumes only complete frames and leaves partial
//! input untouched so the next read can extend it. The encoder covers every
//! reply kind the server produces.

use bytes::{Buf, BytesMut};
use thiserror::Error;

/// Bulk strings larger than this are rejected as malformed.
const MAX_BULK_LENGTH: usize = 512 * 1024 * 1024;

#[derive(Error, Debug, PartialEq)]
pub enum RespError {
    #[error("invalid RESP format")]
    InvalidFormat,
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,
    #[error("bulk string length out of range")]
    BulkLengthOutOfRange,
}

impl RespError {
    /// Wire form sent back to the client. Malformed input is reported with a
    /// single message regardless of which rule was broken; the connection
    /// keeps reading afterwards.
    pub fn as_string(&self) -> String {
        RespValue::Error("ERR invalid RESP format".to_string()).encode()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum RespValue {
    SimpleString(String),
    Error(String),
    Integer(i64),
    BulkString(String),
    /// The nil bulk string `$-1\r\n`.
    Null,
    Array(Vec<RespValue>),
}

impl RespValue {
    /// Drains every complete frame from `buffer`.
    ///
    /// Partial trailing input is left in the buffer for the next read;
    /// malformed input returns an error without consuming anything, so the
    /// caller can discard the buffer and reply with a protocol error.
    pub fn parse(buffer: &mut BytesMut) -> Result<Vec<RespValue>, RespError> {
        let mut values = Vec::new();

        while let Some((value, consumed)) = Self::decode(&buffer[..])? {
            buffer.advance(consumed);
            values.push(value);
        }

        Ok(values)
    }

    /// Decodes one frame starting at the beginning of `input`.
    ///
    /// Returns `Ok(None)` when the input holds only a prefix of a frame and
    /// more bytes are needed. On success the second tuple element is the
    /// number of bytes the frame occupied, which the replica stream parser
    /// uses for its acknowledged-offset accounting.
    pub fn decode(input: &[u8]) -> Result<Option<(RespValue, usize)>, RespError> {
        Self::decode_at(input, 0)
    }

    fn decode_at(input: &[u8], start: usize) -> Result<Option<(RespValue, usize)>, RespError> {
        let Some((line, after_line)) = read_line(input, start) else {
            return Ok(None);
        };

        if line.is_empty() {
            return Err(RespError::InvalidFormat);
        }

        match line[0] {
            b'+' => {
                let content = utf8(&line[1..])?;
                Ok(Some((
                    RespValue::SimpleString(content.to_string()),
                    after_line - start,
                )))
            }
            b'-' => {
                let content = utf8(&line[1..])?;
                Ok(Some((
                    RespValue::Error(content.to_string()),
                    after_line - start,
                )))
            }
            b':' => {
                let number = utf8(&line[1..])?
                    .parse::<i64>()
                    .map_err(|_| RespError::InvalidFormat)?;
                Ok(Some((RespValue::Integer(number), after_line - start)))
            }
            b'$' => Self::decode_bulk(input, start, line, after_line),
            b'*' => Self::decode_array(input, start, line, after_line),
            _ => Err(RespError::InvalidFormat),
        }
    }

    fn decode_bulk(
        input: &[u8],
        start: usize,
        header: &[u8],
        after_header: usize,
    ) -> Result<Option<(RespValue, usize)>, RespError> {
        let declared = utf8(&header[1..])?
            .parse::<i64>()
            .map_err(|_| RespError::InvalidFormat)?;

        if declared == -1 {
            return Ok(Some((RespValue::Null, after_header - start)));
        }

        if declared < 0 || declared as usize > MAX_BULK_LENGTH {
            return Err(RespError::BulkLengthOutOfRange);
        }

        let length = declared as usize;
        let data_end = after_header + length;

        if input.len() < data_end + 2 {
            return Ok(None);
        }

        if &input[data_end..data_end + 2] != b"\r\n" {
            return Err(RespError::InvalidFormat);
        }

        let content = utf8(&input[after_header..data_end])?;

        Ok(Some((
            RespValue::BulkString(content.to_string()),
            data_end + 2 - start,
        )))
    }

    fn decode_array(
        input: &[u8],
        start: usize,
        header: &[u8],
        after_header: usize,
    ) -> Result<Option<(RespValue, usize)>, RespError> {
        let declared = utf8(&header[1..])?
            .parse::<i64>()
            .map_err(|_| RespError::InvalidFormat)?;

        if declared < 0 {
            return Err(RespError::InvalidFormat);
        }

        // cap the pre-allocation; the declared count is untrusted input
        let mut elements = Vec::with_capacity((declared as usize).min(64));
        let mut cursor = after_header;

        for _ in 0..declared {
            let Some((element, consumed)) = Self::decode_at(input, cursor)? else {
                return Ok(None);
            };

            elements.push(element);
            cursor += consumed;
        }

        Ok(Some((RespValue::Array(elements), cursor - start)))
    }

    /// Serializes the value into its RESP2 wire form.
    pub fn encode(&self) -> String {
        match self {
            RespValue::SimpleString(content) => format!("+{}\r\n", content),
            RespValue::Error(content) => format!("-{}\r\n", content),
            RespValue::Integer(number) => format!(":{}\r\n", number),
            RespValue::BulkString(content) => {
                format!("${}\r\n{}\r\n", content.len(), content)
            }
            RespValue::Null => "$-1\r\n".to_string(),
            RespValue::Array(elements) => {
                let mut encoded = format!("*{}\r\n", elements.len());
                for element in elements {
                    encoded.push_str(&element.encode());
                }
                encoded
            }
        }
    }

    /// Encodes a flat array of bulk strings, the shape used for list and
    /// sorted-set range replies.
    pub fn encode_array_from_strings<I, S>(items: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RespValue::Array(
            items
                .into_iter()
                .map(|item| RespValue::BulkString(item.into()))
                .collect(),
        )
        .encode()
    }

    /// Canonical RESP-array encoding of a command argument vector. This is
    /// the form the primary writes to its replicas.
    pub fn command_array(name: &str, arguments: &[String]) -> RespValue {
        let mut elements = Vec::with_capacity(arguments.len() + 1);
        elements.push(RespValue::BulkString(name.to_string()));

        for argument in arguments {
            elements.push(RespValue::BulkString(argument.clone()));
        }

        RespValue::Array(elements)
    }
}

fn read_line(input: &[u8], start: usize) -> Option<(&[u8], usize)> {
    let haystack = input.get(start..)?;
    let position = haystack.windows(2).position(|window| window == b"\r\n")?;

    Some((&haystack[..position], start + position + 2))
}

fn utf8(bytes: &[u8]) -> Result<&str, RespError> {
    str::from_utf8(bytes).map_err(|_| RespError::InvalidUtf8)
}
