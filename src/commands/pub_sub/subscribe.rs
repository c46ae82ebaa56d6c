use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::pubsub::PubSubRegistry;
use crate::resp::RespValue;
use crate::session::Session;

pub struct SubscribeArguments {
    channels: Vec<String>,
}

impl SubscribeArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.is_empty() {
            return Err(CommandError::wrong_arity("SUBSCRIBE"));
        }

        Ok(Self {
            channels: arguments.to_vec(),
        })
    }
}

/// Subscribes the session to each listed channel in argument order,
/// emitting one push frame per channel whose counter is the session's
/// total subscription count after that add. Subscribing twice to the same
/// channel is idempotent and repeats the same count.
pub async fn subscribe(
    registry: &Arc<RwLock<PubSubRegistry>>,
    session: &mut Session,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let subscribe_arguments = SubscribeArguments::parse(arguments)?;

    let mut registry_guard = registry.write().await;
    let mut replies = String::new();

    for channel in subscribe_arguments.channels {
        let count = registry_guard.subscribe(
            &channel,
            &session.client_address,
            Arc::clone(&session.writer),
        );

        replies.push_str(
            &RespValue::Array(vec![
                RespValue::BulkString("subscribe".to_string()),
                RespValue::BulkString(channel),
                RespValue::Integer(count as i64),
            ])
            .encode(),
        );
    }

    session.subscribed = true;

    Ok(CommandResult::Response(replies))
}
