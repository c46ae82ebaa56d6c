use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::key_value_store::{DataType, KeyValueStore, Value};
use crate::resp::RespValue;

pub struct IncrArguments {
    key: String,
}

impl IncrArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::wrong_arity("INCR"));
        }

        Ok(Self {
            key: arguments[0].clone(),
        })
    }
}

/// Parses the stored string as a signed 64-bit integer, increments it and
/// stores the decimal text back. A missing key starts from 0. The whole
/// read-modify-write runs under the exclusive guard so concurrent INCRs on
/// the same key serialize.
pub async fn incr(
    store: &Arc<RwLock<KeyValueStore>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let incr_arguments = IncrArguments::parse(arguments)?;

    let mut store_guard = store.write().await;

    if let Some(value) = store_guard.get_live_mut(&incr_arguments.key) {
        return match value.data {
            DataType::String(ref mut stored) => {
                let current = stored
                    .parse::<i64>()
                    .map_err(|_| CommandError::NotAnInteger)?;
                let incremented = current.checked_add(1).ok_or(CommandError::NotAnInteger)?;

                *stored = incremented.to_string();

                Ok(CommandResult::Response(
                    RespValue::Integer(incremented).encode(),
                ))
            }
            _ => Err(CommandError::wrong_type("INCR")),
        };
    }

    store_guard.insert(
        incr_arguments.key,
        Value::new(DataType::String("1".to_string())),
    );

    Ok(CommandResult::Response(RespValue::Integer(1).encode()))
}
