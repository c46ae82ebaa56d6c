use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::key_value_store::{DataType, KeyValueStore};
use crate::resp::RespValue;

pub struct GetArguments {
    key: String,
}

impl GetArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::wrong_arity("GET"));
        }

        Ok(Self {
            key: arguments[0].clone(),
        })
    }
}

/// Reads take the shared guard; discovering an expired record upgrades to
/// the exclusive guard just long enough to evict it before answering nil.
pub async fn get(
    store: &Arc<RwLock<KeyValueStore>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let get_arguments = GetArguments::parse(arguments)?;

    {
        let store_guard = store.read().await;

        if let Some(value) = store_guard.get_live(&get_arguments.key) {
            return match &value.data {
                DataType::String(content) => Ok(CommandResult::Response(
                    RespValue::BulkString(content.clone()).encode(),
                )),
                _ => Err(CommandError::wrong_type("GET")),
            };
        }

        if store_guard.get(&get_arguments.key).is_none() {
            return Ok(CommandResult::Response(RespValue::Null.encode()));
        }
    }

    // the record is present but expired; evict it before answering absent
    store.write().await.evict_if_expired(&get_arguments.key);

    Ok(CommandResult::Response(RespValue::Null.encode()))
}
