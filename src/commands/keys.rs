use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::key_value_store::KeyValueStore;
use crate::rdb;
use crate::resp::RespValue;
use crate::server::RedisServer;

pub struct KeysArguments {
    pattern: String,
}

impl KeysArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::wrong_arity("KEYS"));
        }

        Ok(Self {
            pattern: arguments[0].clone(),
        })
    }
}

/// Only the literal `*` pattern is supported. The reply is the union of
/// the live in-memory keys and the string keys found in the RDB file named
/// by the configured directory and filename, when such a file exists.
pub async fn keys(
    store: &Arc<RwLock<KeyValueStore>>,
    server: &Arc<RwLock<RedisServer>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let keys_arguments = KeysArguments::parse(arguments)?;

    if keys_arguments.pattern != "*" {
        return Err(CommandError::UnsupportedKeysPattern);
    }

    let mut all_keys = store.read().await.keys();

    let (directory, filename) = {
        let server_guard = server.read().await;
        (
            server_guard.rdb_directory.clone(),
            server_guard.rdb_filename.clone(),
        )
    };

    for key in rdb::read_string_keys(&directory, &filename).await {
        if !all_keys.contains(&key) {
            all_keys.push(key);
        }
    }

    Ok(CommandResult::Response(
        RespValue::encode_array_from_strings(all_keys),
    ))
}
