//! Minimal RDB support.
//!
//! The server is in-memory and never writes a dump. Two narrow pieces of
//! the format are still needed: the fixed empty-database snapshot a primary
//! sends inside the FULLRESYNC bulk, and a just-enough reader that lets
//! `KEYS *` surface string keys from an RDB file named by `--dir` and
//! `--dbfilename` when one happens to exist.

use std::path::Path;

use tokio::fs;
use tracing::debug;

/// A valid empty-database snapshot: `REDIS0011` magic, a few metadata
/// fields, then EOF opcode and CRC64 trailer. Sent verbatim as the
/// FULLRESYNC payload.
pub const EMPTY_RDB_SNAPSHOT: &[u8] = &[
    0x52, 0x45, 0x44, 0x49, 0x53, 0x30, 0x30, 0x31, 0x31, 0xfa, 0x09, 0x72, //
    0x65, 0x64, 0x69, 0x73, 0x2d, 0x76, 0x65, 0x72, 0x05, 0x37, 0x2e, 0x32, //
    0x2e, 0x30, 0xfa, 0x0a, 0x72, 0x65, 0x64, 0x69, 0x73, 0x2d, 0x62, 0x69, //
    0x74, 0x73, 0xc0, 0x40, 0xfa, 0x05, 0x63, 0x74, 0x69, 0x6d, 0x65, 0xc2, //
    0x6d, 0x08, 0xbc, 0x65, 0xfa, 0x08, 0x75, 0x73, 0x65, 0x64, 0x2d, 0x6d, //
    0x65, 0x6d, 0xc2, 0xb0, 0xc4, 0x10, 0x00, 0xfa, 0x08, 0x61, 0x6f, 0x66, //
    0x2d, 0x62, 0x61, 0x73, 0x65, 0xc0, 0x00, 0xff, 0xf0, 0x6e, 0x3b, 0xfe, //
    0xc0, 0xff, 0x5a, 0xa2,
];

const MAGIC: &[u8] = b"REDIS0011";
const HASH_TABLE_MARKER: u8 = 0xFB;

/// Reads the string keys out of the RDB file at `<directory>/<filename>`.
///
/// Minimal contract: verify the magic, scan forward to the hash-table
/// marker, skip the two size bytes and the value-type byte, then read one
/// length-prefixed key/value pair. A missing or unreadable file is treated
/// as an empty database.
pub async fn read_string_keys(directory: &str, filename: &str) -> Vec<String> {
    let file_path = Path::new(directory).join(filename);

    let data = match fs::read(&file_path).await {
        Ok(data) => data,
        Err(e) => {
            debug!("no RDB file at {}: {}", file_path.display(), e);
            return Vec::new();
        }
    };

    parse_string_keys(&data)
}

fn parse_string_keys(data: &[u8]) -> Vec<String> {
    if data.len() < MAGIC.len() || &data[..MAGIC.len()] != MAGIC {
        return Vec::new();
    }

    let Some(marker) = data
        .iter()
        .skip(MAGIC.len())
        .position(|&byte| byte == HASH_TABLE_MARKER)
    else {
        return Vec::new();
    };

    // marker byte + hash table size + expiry table size + value type
    let mut cursor = MAGIC.len() + marker + 4;

    let Some(key) = read_length_prefixed_string(data, &mut cursor) else {
        return Vec::new();
    };

    if read_length_prefixed_string(data, &mut cursor).is_none() {
        return Vec::new();
    }

    vec![key]
}

/// Length-prefixed string per the RDB length encoding: the top two bits of
/// the first byte select 6-bit, 14-bit, or 32-bit lengths. The `0xC0`
/// integer encodings are unsupported and end the scan.
fn read_length_prefixed_string(data: &[u8], cursor: &mut usize) -> Option<String> {
    let first = *data.get(*cursor)?;
    *cursor += 1;

    let length = match first & 0xC0 {
        0x00 => (first & 0x3F) as usize,
        0x40 => {
            let second = *data.get(*cursor)?;
            *cursor += 1;
            ((first & 0x3F) as usize) << 8 | second as usize
        }
        0x80 => {
            let bytes = data.get(*cursor..*cursor + 4)?;
            *cursor += 4;
            u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize
        }
        _ => return None,
    };

    let bytes = data.get(*cursor..*cursor + length)?;
    *cursor += length;

    String::from_utf8(bytes.to_vec()).ok()
}
