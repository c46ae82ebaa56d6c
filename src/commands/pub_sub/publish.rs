use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::pubsub::PubSubRegistry;
use crate::resp::RespValue;

pub struct PublishArguments {
    channel: String,
    message: String,
}

impl PublishArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 2 {
            return Err(CommandError::wrong_arity("PUBLISH"));
        }

        Ok(Self {
            channel: arguments[0].clone(),
            message: arguments[1].clone(),
        })
    }
}

/// Delivers the message to every subscriber of the channel and replies to
/// the publisher with the number of connections it reached.
pub async fn publish(
    registry: &Arc<RwLock<PubSubRegistry>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let publish_arguments = PublishArguments::parse(arguments)?;

    let delivered = registry
        .write()
        .await
        .publish(&publish_arguments.channel, &publish_arguments.message)
        .await;

    Ok(CommandResult::Response(
        RespValue::Integer(delivered as i64).encode(),
    ))
}
