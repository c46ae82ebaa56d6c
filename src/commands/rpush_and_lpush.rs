use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::key_value_store::{DataType, KeyValueStore, Value};
use crate::resp::RespValue;

pub struct PushArguments {
    key: String,
    elements: Vec<String>,
    prepend: bool,
}

impl PushArguments {
    pub fn parse(command: &str, arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::wrong_arity(command));
        }

        Ok(Self {
            key: arguments[0].clone(),
            elements: arguments[1..].to_vec(),
            prepend: command.eq_ignore_ascii_case("LPUSH"),
        })
    }
}

/// RPUSH appends, LPUSH prepends one element at a time (so `LPUSH k a b c`
/// leaves the list as `c b a`). A missing key is created; reply is the
/// resulting list length.
pub async fn push(
    store: &Arc<RwLock<KeyValueStore>>,
    command: &str,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let push_arguments = PushArguments::parse(command, arguments)?;

    let mut store_guard = store.write().await;

    if let Some(value) = store_guard.get_live_mut(&push_arguments.key) {
        let length = match value.data {
            DataType::List(ref mut list) => {
                for element in push_arguments.elements {
                    if push_arguments.prepend {
                        list.push_front(element);
                    } else {
                        list.push_back(element);
                    }
                }
                list.len()
            }
            _ => return Err(CommandError::wrong_type(command)),
        };

        return Ok(CommandResult::Response(
            RespValue::Integer(length as i64).encode(),
        ));
    }

    let mut list = VecDeque::with_capacity(push_arguments.elements.len());

    for element in push_arguments.elements {
        if push_arguments.prepend {
            list.push_front(element);
        } else {
            list.push_back(element);
        }
    }

    let length = list.len();
    store_guard.insert(push_arguments.key, Value::new(DataType::List(list)));

    Ok(CommandResult::Response(
        RespValue::Integer(length as i64).encode(),
    ))
}
