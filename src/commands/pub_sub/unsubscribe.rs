use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::pubsub::PubSubRegistry;
use crate::resp::RespValue;
use crate::session::Session;

/// With channel arguments, emits one push frame per named channel whether
/// or not the session was subscribed to it. Without arguments, removes
/// every current subscription, one push frame per removal. The session
/// leaves subscribed mode when its count reaches zero.
pub async fn unsubscribe(
    registry: &Arc<RwLock<PubSubRegistry>>,
    session: &mut Session,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let mut registry_guard = registry.write().await;

    let channels = if arguments.is_empty() {
        registry_guard.channels_for_client(&session.client_address)
    } else {
        arguments.to_vec()
    };

    // no arguments and no subscriptions still produces one reply, with a
    // nil channel, so the client sees exactly one frame per command
    if channels.is_empty() {
        session.subscribed = false;

        return Ok(CommandResult::Response(
            RespValue::Array(vec![
                RespValue::BulkString("unsubscribe".to_string()),
                RespValue::Null,
                RespValue::Integer(0),
            ])
            .encode(),
        ));
    }

    let mut replies = String::new();

    for channel in channels {
        let remaining = registry_guard.unsubscribe(&channel, &session.client_address);

        replies.push_str(
            &RespValue::Array(vec![
                RespValue::BulkString("unsubscribe".to_string()),
                RespValue::BulkString(channel),
                RespValue::Integer(remaining as i64),
            ])
            .encode(),
        );
    }

    if registry_guard.subscription_count(&session.client_address) == 0 {
        session.subscribed = false;
    }

    Ok(CommandResult::Response(replies))
}
