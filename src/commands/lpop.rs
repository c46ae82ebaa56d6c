use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::key_value_store::{DataType, KeyValueStore};
use crate::resp::RespValue;

pub struct LpopArguments {
    key: String,
    /// `None` for the plain form, which replies with a single bulk string;
    /// `Some(n)` for the count form, which always replies with an array.
    count: Option<usize>,
}

impl LpopArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.is_empty() || arguments.len() > 2 {
            return Err(CommandError::wrong_arity("LPOP"));
        }

        let count = match arguments.get(1) {
            Some(raw) => Some(raw.parse::<usize>().map_err(|_| CommandError::NotAnInteger)?),
            None => None,
        };

        Ok(Self {
            key: arguments[0].clone(),
            count,
        })
    }
}

pub async fn lpop(
    store: &Arc<RwLock<KeyValueStore>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let lpop_arguments = LpopArguments::parse(arguments)?;

    if lpop_arguments.count == Some(0) {
        return Ok(CommandResult::Response(
            RespValue::Array(Vec::new()).encode(),
        ));
    }

    let mut store_guard = store.write().await;

    let Some(value) = store_guard.get_live_mut(&lpop_arguments.key) else {
        return Ok(CommandResult::Response(RespValue::Null.encode()));
    };

    let DataType::List(ref mut list) = value.data else {
        return Err(CommandError::wrong_type("LPOP"));
    };

    let mut removed = Vec::new();

    for _ in 0..lpop_arguments.count.unwrap_or(1) {
        match list.pop_front() {
            Some(element) => removed.push(element),
            None => break,
        }
    }

    let drained = list.is_empty();

    if drained {
        store_guard.remove(&lpop_arguments.key);
    }

    if removed.is_empty() {
        return Ok(CommandResult::Response(RespValue::Null.encode()));
    }

    let response = match lpop_arguments.count {
        None => RespValue::BulkString(removed.remove(0)).encode(),
        Some(_) => RespValue::encode_array_from_strings(removed),
    };

    Ok(CommandResult::Response(response))
}
