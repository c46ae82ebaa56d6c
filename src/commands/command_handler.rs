use crate::commands::{
    CommandError, config_get, del, echo, get, incr, info, keys, llen, lpop, lrange, ping,
    pub_sub, replication, rpush_and_lpush, set, type_command, zsets,
};
use crate::resp::RespValue;
use crate::server::SharedState;
use crate::session::Session;

/// Commands whose argument vector is re-encoded canonically and fanned out
/// to the replica list after the local mutation succeeds.
pub const WRITE_COMMANDS: &[&str] = &[
    "SET", "DEL", "INCR", "RPUSH", "LPUSH", "LPOP", "ZADD", "ZREM",
];

/// What a command produced.
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// An ordinary RESP reply to write back to the client.
    Response(String),
    /// PSYNC accepted: the connection loop must write `header`, then the
    /// RDB snapshot bulk, and hand the connection to the replica registry.
    FullResync { header: String },
}

/// A parsed command: upper-cased name plus its raw argument vector.
#[derive(Debug, PartialEq, Clone)]
pub struct CommandHandler {
    pub name: String,
    pub arguments: Vec<String>,
}

impl CommandHandler {
    /// Builds a command from a decoded RESP frame. Clients send commands as
    /// arrays of bulk strings; anything else is not a command.
    pub fn new(input: &RespValue) -> Result<Self, CommandError> {
        let RespValue::Array(elements) = input else {
            return Err(CommandError::UnknownCommand);
        };

        let mut parts = Vec::with_capacity(elements.len());

        for element in elements {
            match element {
                RespValue::BulkString(s) => parts.push(s.clone()),
                _ => return Err(CommandError::UnknownCommand),
            }
        }

        Self::from_parts(parts)
    }

    /// Builds a command from an already-flattened argument vector, the form
    /// the replica stream parser produces.
    pub fn from_parts(parts: Vec<String>) -> Result<Self, CommandError> {
        let Some((name, arguments)) = parts.split_first() else {
            return Err(CommandError::UnknownCommand);
        };

        Ok(Self {
            name: name.to_uppercase(),
            arguments: arguments.to_vec(),
        })
    }

    pub fn is_write_command(&self) -> bool {
        WRITE_COMMANDS.contains(&self.name.as_str())
    }

    /// Arity/shape validation without execution, used when queueing inside
    /// MULTI so a bad command is rejected at queue time.
    pub fn validate_arguments(&self) -> Option<CommandError> {
        match self.name.as_str() {
            "PING" => ping::PingArguments::parse(&self.arguments).err(),
            "ECHO" => echo::EchoArguments::parse(&self.arguments).err(),
            "SET" => set::SetArguments::parse(&self.arguments).err(),
            "GET" => get::GetArguments::parse(&self.arguments).err(),
            "DEL" => del::DelArguments::parse(&self.arguments).err(),
            "TYPE" => type_command::TypeArguments::parse(&self.arguments).err(),
            "INCR" => incr::IncrArguments::parse(&self.arguments).err(),
            "KEYS" => keys::KeysArguments::parse(&self.arguments).err(),
            "CONFIG" => config_get::ConfigGetArguments::parse(&self.arguments).err(),
            "INFO" => info::InfoArguments::parse(&self.arguments).err(),
            "RPUSH" | "LPUSH" => {
                rpush_and_lpush::PushArguments::parse(&self.name, &self.arguments).err()
            }
            "LPOP" => lpop::LpopArguments::parse(&self.arguments).err(),
            "LLEN" => llen::LlenArguments::parse(&self.arguments).err(),
            "LRANGE" => lrange::LrangeArguments::parse(&self.arguments).err(),
            "SUBSCRIBE" => pub_sub::SubscribeArguments::parse(&self.arguments).err(),
            "UNSUBSCRIBE" => None,
            "PUBLISH" => pub_sub::PublishArguments::parse(&self.arguments).err(),
            "ZADD" => zsets::ZaddArguments::parse(&self.arguments).err(),
            "ZRANK" => zsets::MemberArguments::parse("ZRANK", &self.arguments).err(),
            "ZRANGE" => zsets::ZrangeArguments::parse(&self.arguments).err(),
            "ZCARD" => zsets::ZcardArguments::parse(&self.arguments).err(),
            "ZSCORE" => zsets::MemberArguments::parse("ZSCORE", &self.arguments).err(),
            "ZREM" => zsets::MemberArguments::parse("ZREM", &self.arguments).err(),
            "REPLCONF" => None,
            "PSYNC" => replication::PsyncArguments::parse(&self.arguments).err(),
            _ => Some(CommandError::UnknownCommand),
        }
    }

    /// Executes the command against the shared registries and the calling
    /// session. Successful write commands on a primary are propagated to
    /// every attached replica afterwards, in apply order.
    pub async fn execute(
        &self,
        shared: &SharedState,
        session: &mut Session,
    ) -> Result<CommandResult, CommandError> {
        let result = match self.name.as_str() {
            "PING" => ping::ping(session, &self.arguments),
            "ECHO" => echo::echo(&self.arguments),
            "SET" => set::set(&shared.store, &self.arguments).await,
            "GET" => get::get(&shared.store, &self.arguments).await,
            "DEL" => del::del(&shared.store, &self.arguments).await,
            "TYPE" => type_command::type_command(&shared.store, &self.arguments).await,
            "INCR" => incr::incr(&shared.store, &self.arguments).await,
            "KEYS" => keys::keys(&shared.store, &shared.server, &self.arguments).await,
            "CONFIG" => config_get::config_get(&shared.server, &self.arguments).await,
            "INFO" => info::info(&shared.server, &self.arguments).await,
            "RPUSH" | "LPUSH" => {
                rpush_and_lpush::push(&shared.store, &self.name, &self.arguments).await
            }
            "LPOP" => lpop::lpop(&shared.store, &self.arguments).await,
            "LLEN" => llen::llen(&shared.store, &self.arguments).await,
            "LRANGE" => lrange::lrange(&shared.store, &self.arguments).await,
            "SUBSCRIBE" => pub_sub::subscribe(&shared.pub_sub, session, &self.arguments).await,
            "UNSUBSCRIBE" => {
                pub_sub::unsubscribe(&shared.pub_sub, session, &self.arguments).await
            }
            "PUBLISH" => pub_sub::publish(&shared.pub_sub, &self.arguments).await,
            "ZADD" => zsets::zadd(&shared.store, &self.arguments).await,
            "ZRANK" => zsets::zrank(&shared.store, &self.arguments).await,
            "ZRANGE" => zsets::zrange(&shared.store, &self.arguments).await,
            "ZCARD" => zsets::zcard(&shared.store, &self.arguments).await,
            "ZSCORE" => zsets::zscore(&shared.store, &self.arguments).await,
            "ZREM" => zsets::zrem(&shared.store, &self.arguments).await,
            "REPLCONF" => replication::replconf(&shared.server, &self.arguments).await,
            "PSYNC" => replication::psync(&shared.server, &self.arguments).await,
            _ => Err(CommandError::UnknownCommand),
        }?;

        if self.is_write_command() && shared.server.read().await.role.is_primary() {
            self.propagate_to_replicas(shared).await;
        }

        Ok(result)
    }

    async fn propagate_to_replicas(&self, shared: &SharedState) {
        let command = RespValue::command_array(&self.name, &self.arguments);

        let failed = shared.replicas.read().await.propagate(&command).await;

        if !failed.is_empty() {
            shared.replicas.write().await.detach_all(&failed);
        }
    }
}
