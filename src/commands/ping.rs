use crate::commands::{CommandError, CommandResult};
use crate::resp::RespValue;
use crate::session::Session;

pub struct PingArguments;

impl PingArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if !arguments.is_empty() {
            return Err(CommandError::wrong_arity("PING"));
        }

        Ok(Self)
    }
}

/// In subscribed mode PING replies as a two-element push (`pong` plus an
/// empty payload) instead of the usual simple string.
pub fn ping(session: &Session, arguments: &[String]) -> Result<CommandResult, CommandError> {
    PingArguments::parse(arguments)?;

    if session.subscribed {
        return Ok(CommandResult::Response(
            RespValue::Array(vec![
                RespValue::BulkString("pong".to_string()),
                RespValue::BulkString(String::new()),
            ])
            .encode(),
        ));
    }

    Ok(CommandResult::Response(
        RespValue::SimpleString("PONG".to_string()).encode(),
    ))
}
