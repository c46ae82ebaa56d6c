use thiserror::Error;

use crate::resp::RespValue;

/// Every error a command can surface on the wire. The `Display` text is the
/// message that follows the `-ERR ` prefix, so the reply format lives in one
/// place.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum CommandError {
    #[error("wrong number of arguments for '{0}' command")]
    WrongArity(String),
    #[error("wrong type of value for '{0}' command")]
    WrongType(String),
    #[error("value is not an integer or out of range")]
    NotAnInteger,
    #[error("value is not a valid float")]
    NotAFloat,
    #[error("syntax error")]
    SyntaxError,
    #[error("unknown command")]
    UnknownCommand,
    #[error("unsupported CONFIG subcommand")]
    UnsupportedConfigSubcommand,
    #[error("unsupported KEYS pattern")]
    UnsupportedKeysPattern,
    #[error("unsupported INFO section")]
    UnsupportedInfoSection,
    #[error("not allowed to slaves")]
    NotAllowedOnReplica,
    #[error("MULTI calls can not be nested")]
    NestedMulti,
    #[error("EXEC without MULTI")]
    ExecWithoutMulti,
    #[error("DISCARD without MULTI")]
    DiscardWithoutMulti,
    #[error(
        "Can't execute '{0}': only (P|S)SUBSCRIBE / (P|S)UNSUBSCRIBE / PING / QUIT / RESET are allowed in this context"
    )]
    NotAllowedWhileSubscribed(String),
    #[error("invalid PSYNC replication id")]
    InvalidPsyncReplicationId,
}

impl CommandError {
    /// RESP wire form of the error.
    pub fn as_string(&self) -> String {
        RespValue::Error(format!("ERR {}", self)).encode()
    }

    /// Arity error carrying the lower-cased command name, the casing the
    /// wire message uses.
    pub fn wrong_arity(command: &str) -> Self {
        CommandError::WrongArity(command.to_lowercase())
    }

    /// Type error carrying the upper-cased command name.
    pub fn wrong_type(command: &str) -> Self {
        CommandError::WrongType(command.to_uppercase())
    }
}
