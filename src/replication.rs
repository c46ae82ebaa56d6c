//! Primary-side replication fan-out.
//!
//! Connections that complete PSYNC are registered here in arrival order.
//! After a write command succeeds locally, its canonical RESP-array
//! encoding is written to every replica in registry order, so all replicas
//! observe the same command sequence. Fan-out iterates under the registry's
//! read lock; registration and detachment take the write lock.

use tokio::io::AsyncWriteExt;

use tracing::{info, warn};

use crate::pubsub::SubscriberWriter;
use crate::resp::RespValue;

#[derive(Debug)]
struct Replica {
    client_address: String,
    writer: SubscriberWriter,
}

#[derive(Debug, Default)]
pub struct ReplicaRegistry {
    replicas: Vec<Replica>,
}

impl ReplicaRegistry {
    pub fn new() -> Self {
        Self {
            replicas: Vec::new(),
        }
    }

    /// Registers a connection that has completed the full resync. Called
    /// under the write lock.
    pub fn register(&mut self, client_address: String, writer: SubscriberWriter) {
        info!("replica {} attached", client_address);
        self.replicas.push(Replica {
            client_address,
            writer,
        });
    }

    /// Drops the replica for a closed or failed connection. Called under
    /// the write lock.
    pub fn detach(&mut self, client_address: &str) {
        let before = self.replicas.len();
        self.replicas
            .retain(|replica| replica.client_address != client_address);

        if self.replicas.len() != before {
            info!("replica {} detached", client_address);
        }
    }

    pub fn detach_all(&mut self, client_addresses: &[String]) {
        for client_address in client_addresses {
            self.detach(client_address);
        }
    }

    pub fn len(&self) -> usize {
        self.replicas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replicas.is_empty()
    }

    /// Writes the command to every replica in registration order. Runs
    /// under the read lock; the addresses of replicas whose socket write
    /// failed are returned so the caller can detach them under the write
    /// lock.
    pub async fn propagate(&self, command: &RespValue) -> Vec<String> {
        let frame = command.encode();
        let mut failed = Vec::new();

        for replica in &self.replicas {
            let mut writer_guard = replica.writer.write().await;

            let write_result = async {
                writer_guard.write_all(frame.as_bytes()).await?;
                writer_guard.flush().await
            }
            .await;

            if let Err(e) = write_result {
                warn!(
                    "replication write to {} failed: {}",
                    replica.client_address, e
                );
                failed.push(replica.client_address.clone());
            }
        }

        failed
    }
}
