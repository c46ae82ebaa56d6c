use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::key_value_store::{DataType, KeyValueStore};
use crate::resp::RespValue;

pub struct ZrangeArguments {
    key: String,
    start: i64,
    stop: i64,
}

impl ZrangeArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 3 {
            return Err(CommandError::wrong_arity("ZRANGE"));
        }

        let start = arguments[1]
            .parse::<i64>()
            .map_err(|_| CommandError::NotAnInteger)?;
        let stop = arguments[2]
            .parse::<i64>()
            .map_err(|_| CommandError::NotAnInteger)?;

        Ok(Self {
            key: arguments[0].clone(),
            start,
            stop,
        })
    }
}

/// Members between the start and stop ranks inclusive, in (score, member)
/// order. Negative indices count from the end; clamped-empty ranges reply
/// with an empty array.
pub async fn zrange(
    store: &Arc<RwLock<KeyValueStore>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let zrange_arguments = ZrangeArguments::parse(arguments)?;

    let store_guard = store.read().await;

    let Some(value) = store_guard.get_live(&zrange_arguments.key) else {
        return Ok(CommandResult::Response(
            RespValue::Array(Vec::new()).encode(),
        ));
    };

    match &value.data {
        DataType::SortedSet(set) => Ok(CommandResult::Response(
            RespValue::encode_array_from_strings(
                set.range(zrange_arguments.start, zrange_arguments.stop),
            ),
        )),
        _ => Err(CommandError::wrong_type("ZRANGE")),
    }
}
