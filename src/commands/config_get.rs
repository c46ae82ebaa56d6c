use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::{CommandError, CommandResult};
use crate::resp::RespValue;
use crate::server::RedisServer;

pub struct ConfigGetArguments {
    parameter: String,
}

impl ConfigGetArguments {
    /// Only the `CONFIG GET <parameter>` form is supported.
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 2 {
            return Err(CommandError::wrong_arity("CONFIG"));
        }

        if arguments[0].to_uppercase() != "GET" {
            return Err(CommandError::UnsupportedConfigSubcommand);
        }

        Ok(Self {
            parameter: arguments[1].to_lowercase(),
        })
    }
}

pub async fn config_get(
    server: &Arc<RwLock<RedisServer>>,
    arguments: &[String],
) -> Result<CommandResult, CommandError> {
    let config_arguments = ConfigGetArguments::parse(arguments)?;

    let server_guard = server.read().await;

    let value = match config_arguments.parameter.as_str() {
        "dir" => server_guard.rdb_directory.clone(),
        "dbfilename" => server_guard.rdb_filename.clone(),
        _ => return Err(CommandError::UnsupportedConfigSubcommand),
    };

    Ok(CommandResult::Response(
        RespValue::Array(vec![
            RespValue::BulkString(config_arguments.parameter),
            RespValue::BulkString(value),
        ])
        .encode(),
    ))
}
