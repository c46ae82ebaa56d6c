use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::key_value_store::{DataType, KeyValueStore};
use crate::resp::RespValue;

pub struct LlenArguments {
    key: String,
}

impl LlenArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::wrong_arity("LLEN"));
        }

        Ok(Self {
            key: arguments[0].clone(),
        })
    }
}

pub async fn llen(
    store: &Arc<RwLock<KeyValueStore>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let llen_arguments = LlenArguments::parse(arguments)?;

    let store_guard = store.read().await;

    let Some(value) = store_guard.get_live(&llen_arguments.key) else {
        return Ok(CommandResult::Response(RespValue::Integer(0).encode()));
    };

    match &value.data {
        DataType::List(list) => Ok(CommandResult::Response(
            RespValue::Integer(list.len() as i64).encode(),
        )),
        _ => Err(CommandError::wrong_type("LLEN")),
    }
}
