use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::server::RedisServer;

pub struct PsyncArguments {
    repl_id: String,
}

impl PsyncArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 2 {
            return Err(CommandError::wrong_arity("PSYNC"));
        }

        // the offset must at least be numeric, even though only a full
        // resync is ever answered
        arguments[1]
            .parse::<i64>()
            .map_err(|_| CommandError::NotAnInteger)?;

        Ok(Self {
            repl_id: arguments[0].clone(),
        })
    }
}

/// Always answers with a full resync: the connection loop writes the
/// `+FULLRESYNC` header followed by the empty-database snapshot bulk and
/// registers the connection as a replica. Partial resync (`offset` other
/// than -1 against a known id) is not supported.
pub async fn psync(
    server: &Arc<RwLock<RedisServer>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let psync_arguments = PsyncArguments::parse(arguments)?;

    let server_guard = server.read().await;

    if !server_guard.role.is_primary() {
        return Err(CommandError::NotAllowedOnReplica);
    }

    if psync_arguments.repl_id != "?" && psync_arguments.repl_id != server_guard.repl_id {
        return Err(CommandError::InvalidPsyncReplicationId);
    }

    Ok(CommandResult::FullResync {
        header: format!(
            "+FULLRESYNC {} {}\r\n",
            server_guard.repl_id, server_guard.repl_offset
        ),
    })
}
