use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::key_value_store::KeyValueStore;
use crate::resp::RespValue;

pub struct TypeArguments {
    key: String,
}

impl TypeArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::wrong_arity("TYPE"));
        }

        Ok(Self {
            key: arguments[0].clone(),
        })
    }
}

pub async fn type_command(
    store: &Arc<RwLock<KeyValueStore>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let type_arguments = TypeArguments::parse(arguments)?;

    {
        let store_guard = store.read().await;

        if let Some(value) = store_guard.get_live(&type_arguments.key) {
            return Ok(CommandResult::Response(
                RespValue::SimpleString(value.data.type_name().to_string()).encode(),
            ));
        }

        if store_guard.get(&type_arguments.key).is_none() {
            return Ok(CommandResult::Response(
                RespValue::SimpleString("none".to_string()).encode(),
            ));
        }
    }

    store.write().await.evict_if_expired(&type_arguments.key);

    Ok(CommandResult::Response(
        RespValue::SimpleString("none".to_string()).encode(),
    ))
}
