use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::key_value_store::{DataType, KeyValueStore, Value};
use crate::resp::RespValue;

pub struct SetArguments {
    key: String,
    value: String,
    expiration: Option<Timestamp>,
}

impl SetArguments {
    /// `SET key value [PX milliseconds]`. The expiry is converted to an
    /// absolute timestamp at parse time, the moment the write is applied.
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 2 && arguments.len() != 4 {
            return Err(CommandError::wrong_arity("SET"));
        }

        let mut expiration: Option<Timestamp> = None;

        if arguments.len() == 4 {
            if arguments[2].to_uppercase() != "PX" {
                return Err(CommandError::SyntaxError);
            }

            let milliseconds = arguments[3]
                .parse::<u64>()
                .map_err(|_| CommandError::NotAnInteger)?;

            expiration = Some(Timestamp::now() + Duration::from_millis(milliseconds));
        }

        Ok(Self {
            key: arguments[0].clone(),
            value: arguments[1].clone(),
            expiration,
        })
    }
}

pub async fn set(
    store: &Arc<RwLock<KeyValueStore>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let set_arguments = SetArguments::parse(arguments)?;

    let value = match set_arguments.expiration {
        Some(expiration) => {
            Value::with_expiration(DataType::String(set_arguments.value), expiration)
        }
        None => Value::new(DataType::String(set_arguments.value)),
    };

    let mut store_guard = store.write().await;
    store_guard.insert(set_arguments.key, value);

    Ok(CommandResult::Response(
        RespValue::SimpleString("OK".to_string()).encode(),
    ))
}
