use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::key_value_store::{DataType, KeyValueStore};
use crate::resp::RespValue;

/// Shared argument shape for the `<CMD> key member` commands (ZRANK,
/// ZSCORE, ZREM).
pub struct MemberArguments {
    key: String,
    member: String,
}

impl MemberArguments {
    pub fn parse(command: &str, arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 2 {
            return Err(CommandError::wrong_arity(command));
        }

        Ok(Self {
            key: arguments[0].clone(),
            member: arguments[1].clone(),
        })
    }
}

/// 0-based rank of the member, or nil when the key or member is absent.
pub async fn zrank(
    store: &Arc<RwLock<KeyValueStore>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let zrank_arguments = MemberArguments::parse("ZRANK", arguments)?;

    let store_guard = store.read().await;

    let Some(value) = store_guard.get_live(&zrank_arguments.key) else {
        return Ok(CommandResult::Response(RespValue::Null.encode()));
    };

    match &value.data {
        DataType::SortedSet(set) => match set.rank(&zrank_arguments.member) {
            Some(rank) => Ok(CommandResult::Response(
                RespValue::Integer(rank as i64).encode(),
            )),
            None => Ok(CommandResult::Response(RespValue::Null.encode())),
        },
        _ => Err(CommandError::wrong_type("ZRANK")),
    }
}

/// Score of the member as a bulk string, or nil when absent.
pub async fn zscore(
    store: &Arc<RwLock<KeyValueStore>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let zscore_arguments = MemberArguments::parse("ZSCORE", arguments)?;

    let store_guard = store.read().await;

    let Some(value) = store_guard.get_live(&zscore_arguments.key) else {
        return Ok(CommandResult::Response(RespValue::Null.encode()));
    };

    match &value.data {
        DataType::SortedSet(set) => match set.score(&zscore_arguments.member) {
            Some(score) => Ok(CommandResult::Response(
                RespValue::BulkString(score.to_string()).encode(),
            )),
            None => Ok(CommandResult::Response(RespValue::Null.encode())),
        },
        _ => Err(CommandError::wrong_type("ZSCORE")),
    }
}

/// Removes the member, replying `:1` when it was present and `:0`
/// otherwise (including an absent key).
pub async fn zrem(
    store: &Arc<RwLock<KeyValueStore>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let zrem_arguments = MemberArguments::parse("ZREM", arguments)?;

    let mut store_guard = store.write().await;

    if let Some(value) = store_guard.get_live_mut(&zrem_arguments.key) {
        return match value.data {
            DataType::SortedSet(ref mut set) => {
                let removed = set.remove(&zrem_arguments.member);

                Ok(CommandResult::Response(
                    RespValue::Integer(removed as i64).encode(),
                ))
            }
            _ => Err(CommandError::wrong_type("ZREM")),
        };
    }

    Ok(CommandResult::Response(RespValue::Integer(0).encode()))
}
