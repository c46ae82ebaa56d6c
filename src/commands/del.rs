use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::key_value_store::KeyValueStore;
use crate::resp::RespValue;

pub struct DelArguments {
    keys: Vec<String>,
}

impl DelArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.is_empty() {
            return Err(CommandError::wrong_arity("DEL"));
        }

        Ok(Self {
            keys: arguments.to_vec(),
        })
    }
}

/// Removes each named key, counting only keys that were actually present.
/// Expired records count as absent.
pub async fn del(
    store: &Arc<RwLock<KeyValueStore>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let del_arguments = DelArguments::parse(arguments)?;

    let mut store_guard = store.write().await;
    let mut removed = 0;

    for key in &del_arguments.keys {
        if store_guard.evict_if_expired(key) {
            continue;
        }

        if store_guard.remove(key).is_some() {
            removed += 1;
        }
    }

    Ok(CommandResult::Response(
        RespValue::Integer(removed).encode(),
    ))
}
