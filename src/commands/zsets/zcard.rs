use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::key_value_store::{DataType, KeyValueStore};
use crate::resp::RespValue;

pub struct ZcardArguments {
    key: String,
}

impl ZcardArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::wrong_arity("ZCARD"));
        }

        Ok(Self {
            key: arguments[0].clone(),
        })
    }
}

pub async fn zcard(
    store: &Arc<RwLock<KeyValueStore>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let zcard_arguments = ZcardArguments::parse(arguments)?;

    let store_guard = store.read().await;

    let Some(value) = store_guard.get_live(&zcard_arguments.key) else {
        return Ok(CommandResult::Response(RespValue::Integer(0).encode()));
    };

    match &value.data {
        DataType::SortedSet(set) => Ok(CommandResult::Response(
            RespValue::Integer(set.len() as i64).encode(),
        )),
        _ => Err(CommandError::wrong_type("ZCARD")),
    }
}
