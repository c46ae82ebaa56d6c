//! Per-connection session state.
//!
//! Each client connection owns exactly one `Session`; no two tasks share
//! one. The session tracks which of the three modes the connection is in
//! (normal, inside MULTI, subscribed) together with the transaction queue
//! and the shared handle to the connection's writer half that pub/sub and
//! replication hand out.

use crate::commands::CommandHandler;
use crate::pubsub::SubscriberWriter;

#[derive(Debug)]
pub struct Session {
    /// Peer address string, used as the connection's identity in the
    /// pub/sub and replica registries.
    pub client_address: String,
    pub writer: SubscriberWriter,
    /// Set between MULTI and EXEC/DISCARD.
    pub multi_on: bool,
    /// Commands queued inside the open transaction, in arrival order.
    pub queued_commands: Vec<CommandHandler>,
    /// Set while the connection has at least one channel subscription;
    /// gates the allowed command set.
    pub subscribed: bool,
}

impl Session {
    pub fn new(client_address: String, writer: SubscriberWriter) -> Self {
        Self {
            client_address,
            writer,
            multi_on: false,
            queued_commands: Vec::new(),
            subscribed: false,
        }
    }
}
