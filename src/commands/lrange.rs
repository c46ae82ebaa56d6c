use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::key_value_store::{DataType, KeyValueStore};
use crate::resp::RespValue;

pub struct LrangeArguments {
    key: String,
    start: i64,
    stop: i64,
}

impl LrangeArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 3 {
            return Err(CommandError::wrong_arity("LRANGE"));
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

/// Inclusive range read with Redis index semantics: negative indices count
/// from the tail and clamp at 0, a start beyond the end (or past the stop)
/// yields an empty array, and the stop clamps to the last element.
pub async fn lrange(
    store: &Arc<RwLock<KeyValueStore>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let lrange_arguments = LrangeArguments::parse(arguments)?;

    let store_guard = store.read().await;

    let Some(value) = store_guard.get_live(&lrange_arguments.key) else {
        return Ok(CommandResult::Response(
            RespValue::Array(Vec::new()).encode(),
        ));
    };

    let DataType::List(list) = &value.data else {
        return Err(CommandError::wrong_type("LRANGE"));
    };

    let length = list.len() as i64;

    let start = normalize_index(lrange_arguments.start, length);
    let mut stop = normalize_index(lrange_arguments.stop, length);

    if start >= length || start > stop {
        return Ok(CommandResult::Response(
            RespValue::Array(Vec::new()).encode(),
        ));
    }

    if stop >= length {
        stop = length - 1;
    }

    let elements: Vec<String> = list
        .iter()
        .skip(start as usize)
        .take((stop - start + 1) as usize)
        .cloned()
        .collect();

    Ok(CommandResult::Response(
        RespValue::encode_array_from_strings(elements),
    ))
}

fn normalize_index(index: i64, length: i64) -> i64 {
    if index < 0 {
        (length + index).max(0)
    } else {
        index
    }
}
