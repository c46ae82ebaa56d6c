use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::resp::RespValue;
use crate::server::RedisServer;

pub struct InfoArguments;

impl InfoArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() > 1 {
            return Err(CommandError::wrong_arity("INFO"));
        }

        if let Some(section) = arguments.first() {
            if section.to_lowercase() != "replication" {
                return Err(CommandError::UnsupportedInfoSection);
            }
        }

        Ok(Self)
    }
}

/// Bulk string of newline-separated replication fields. Only the
/// replication section exists, so the section argument merely filters
/// nothing.
pub async fn info(
    server: &Arc<RwLock<RedisServer>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    InfoArguments::parse(arguments)?;

    let server_guard = server.read().await;

    let payload = format!(
        "role:{}\nmaster_replid:{}\nmaster_repl_offset:{}",
        server_guard.role.as_string(),
        server_guard.repl_id,
        server_guard.repl_offset,
    );

    Ok(CommandResult::Response(
        RespValue::BulkString(payload).encode(),
    ))
}
