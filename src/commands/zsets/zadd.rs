use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::key_value_store::{DataType, KeyValueStore, Value};
use crate::resp::RespValue;
use crate::sorted_set::SortedSet;

pub struct ZaddArguments {
    key: String,
    score: f64,
    member: String,
}

impl ZaddArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 3 {
            return Err(CommandError::wrong_arity("ZADD"));
        }

        let score = arguments[1]
            .parse::<f64>()
            .map_err(|_| CommandError::NotAFloat)?;

        if score.is_nan() {
            return Err(CommandError::NotAFloat);
        }

        Ok(Self {
            key: arguments[0].clone(),
            score,
            member: arguments[2].clone(),
        })
    }
}

/// Inserts the member or updates its score. Replies `:1` only when the
/// member is newly added.
pub async fn zadd(
    store: &Arc<RwLock<KeyValueStore>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let zadd_arguments = ZaddArguments::parse(arguments)?;

    let mut store_guard = store.write().await;

    if let Some(value) = store_guard.get_live_mut(&zadd_arguments.key) {
        return match value.data {
            DataType::SortedSet(ref mut set) => {
                let added = set.insert(zadd_arguments.member, zadd_arguments.score);

                Ok(CommandResult::Response(
                    RespValue::Integer(added as i64).encode(),
                ))
            }
            _ => Err(CommandError::wrong_type("ZADD")),
        };
    }

    let mut set = SortedSet::new();
    set.insert(zadd_arguments.member, zadd_arguments.score);
    store_guard.insert(zadd_arguments.key, Value::new(DataType::SortedSet(set)));

    Ok(CommandResult::Response(RespValue::Integer(1).encode()))
}
