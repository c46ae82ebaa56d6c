//! Session-level command classification.
//!
//! Before a command reaches the executor it passes through the session
//! state machine: the subscribed-mode gate, MULTI/EXEC/DISCARD handling and
//! transaction queueing. The dispatcher is synchronous and pure over the
//! session; execution of the resulting plan happens in
//! [`DispatchResult::resolve`].

use crate::commands::{CommandError, CommandHandler, CommandResult};
use crate::resp::RespValue;
use crate::server::SharedState;
use crate::session::Session;

/// Commands that remain legal while the session is in subscribed mode.
const SUBSCRIBED_MODE_ALLOWED: &[&str] = &[
    "SUBSCRIBE",
    "UNSUBSCRIBE",
    "PSUBSCRIBE",
    "PUNSUBSCRIBE",
    "PING",
    "QUIT",
    "RESET",
];

/// The plan for one incoming command.
#[derive(Debug, PartialEq)]
pub enum DispatchResult {
    /// Reply already known without touching the executor.
    Immediate(String),
    /// Run one command now.
    Execute(CommandHandler),
    /// EXEC: run the queued commands in order and fold the replies into one
    /// array.
    ExecuteBatch(Vec<CommandHandler>),
}

/// What the connection loop should do after resolving a dispatch.
#[derive(Debug, PartialEq)]
pub enum ConnectionReply {
    Payload(String),
    /// PSYNC accepted: send `header` plus the snapshot bulk and register
    /// the connection as a replica.
    FullResync { header: String },
}

pub fn dispatch_command(session: &mut Session, command: CommandHandler) -> DispatchResult {
    if session.subscribed && !SUBSCRIBED_MODE_ALLOWED.contains(&command.name.as_str()) {
        return DispatchResult::Immediate(
            CommandError::NotAllowedWhileSubscribed(command.name.to_lowercase()).as_string(),
        );
    }

    let command_name = command.name.clone();

    match command_name.as_str() {
        "MULTI" => {
            if session.multi_on {
                return DispatchResult::Immediate(CommandError::NestedMulti.as_string());
            }

            session.multi_on = true;
            DispatchResult::Immediate(RespValue::SimpleString("OK".to_string()).encode())
        }
        "EXEC" => {
            if !session.multi_on {
                return DispatchResult::Immediate(CommandError::ExecWithoutMulti.as_string());
            }

            session.multi_on = false;
            let queued = std::mem::take(&mut session.queued_commands);

            if queued.is_empty() {
                DispatchResult::Immediate(RespValue::Array(Vec::new()).encode())
            } else {
                DispatchResult::ExecuteBatch(queued)
            }
        }
        "DISCARD" => {
            if !session.multi_on {
                return DispatchResult::Immediate(CommandError::DiscardWithoutMulti.as_string());
            }

            session.multi_on = false;
            session.queued_commands.clear();
            DispatchResult::Immediate(RespValue::SimpleString("OK".to_string()).encode())
        }
        _ if session.multi_on => {
            // reject malformed commands at queue time instead of letting
            // them fail inside EXEC
            if let Some(error) = command.validate_arguments() {
                return DispatchResult::Immediate(error.as_string());
            }

            session.queued_commands.push(command);
            DispatchResult::Immediate(RespValue::SimpleString("QUEUED".to_string()).encode())
        }
        _ => DispatchResult::Execute(command),
    }
}

impl DispatchResult {
    pub async fn resolve(self, shared: &SharedState, session: &mut Session) -> ConnectionReply {
        match self {
            DispatchResult::Immediate(payload) => ConnectionReply::Payload(payload),
            DispatchResult::Execute(command) => {
                match command.execute(shared, session).await {
                    Ok(CommandResult::Response(payload)) => ConnectionReply::Payload(payload),
                    Ok(CommandResult::FullResync { header }) => {
                        ConnectionReply::FullResync { header }
                    }
                    Err(error) => ConnectionReply::Payload(error.as_string()),
                }
            }
            DispatchResult::ExecuteBatch(commands) => {
                let mut replies = Vec::with_capacity(commands.len() + 1);
                replies.push(format!("*{}\r\n", commands.len()));

                for command in commands {
                    match command.execute(shared, session).await {
                        Ok(CommandResult::Response(payload)) => replies.push(payload),
                        Ok(CommandResult::FullResync { header }) => replies.push(header),
                        Err(error) => replies.push(error.as_string()),
                    }
                }

                ConnectionReply::Payload(replies.join(""))
            }
        }
    }
}
