use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::resp::RespValue;
use crate::server::RedisServer;

/// A primary acknowledges every REPLCONF variant with `+OK`; a replica
/// serving clients rejects the command outright.
pub async fn replconf(
    server: &Arc<RwLock<RedisServer>>,
    _arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let server_guard = server.read().await;

    if !server_guard.role.is_primary() {
        return Err(CommandError::NotAllowedOnReplica);
    }

    Ok(CommandResult::Response(
        RespValue::SimpleString("OK".to_string()).encode(),
    ))
}
