//! The per-client connection task.
//!
//! Reads frames from the socket, walks each command through the session
//! state machine and the executor, and writes replies back through a
//! writer half that pub/sub and replication can also reach. Protocol
//! errors are reported without dropping the connection; socket failures
//! terminate the task and release the session's registrations.

use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::commands::{CommandHandler, ConnectionReply, dispatch_command};
use crate::input::{CommandReadError, read_frames};
use crate::pubsub::SubscriberWriter;
use crate::rdb::EMPTY_RDB_SNAPSHOT;
use crate::server::SharedState;
use crate::session::Session;

pub async fn handle_client_connection(
    stream: TcpStream,
    shared: SharedState,
    client_address: String,
) {
    let (mut reader, writer) = stream.into_split();
    let writer: SubscriberWriter = Arc::new(RwLock::new(writer));

    let mut session = Session::new(client_address.clone(), Arc::clone(&writer));
    let mut buffer = BytesMut::with_capacity(1024);

    debug!("client {} connected", client_address);

    loop {
        let frames = match read_frames(&mut reader, &mut buffer).await {
            Ok(frames) => frames,
            Err(CommandReadError::ConnectionClosed) => break,
            Err(CommandReadError::IoError(e)) => {
                debug!("read error on {}: {}", client_address, e);
                break;
            }
            Err(error @ CommandReadError::RespParseError(_)) => {
                if write_to_stream(&writer, error.as_string().as_bytes())
                    .await
                    .is_err()
                {
                    break;
                }
                continue;
            }
        };

        for frame in frames {
            let command = match CommandHandler::new(&frame) {
                Ok(command) => command,
                Err(error) => {
                    if write_to_stream(&writer, error.as_string().as_bytes())
                        .await
                        .is_err()
                    {
                        cleanup_session(&shared, &client_address).await;
                        return;
                    }
                    continue;
                }
            };

            let plan = dispatch_command(&mut session, command);

            match plan.resolve(&shared, &mut session).await {
                ConnectionReply::Payload(payload) => {
                    if write_to_stream(&writer, payload.as_bytes()).await.is_err() {
                        cleanup_session(&shared, &client_address).await;
                        return;
                    }
                }
                ConnectionReply::FullResync { header } => {
                    if perform_full_resync(&shared, &client_address, &writer, &header)
                        .await
                        .is_err()
                    {
                        cleanup_session(&shared, &client_address).await;
                        return;
                    }
                }
            }
        }
    }

    debug!("client {} disconnected", client_address);
    cleanup_session(&shared, &client_address).await;
}

pub async fn write_to_stream(
    writer: &SubscriberWriter,
    response: &[u8],
) -> tokio::io::Result<()> {
    let mut writer_guard = writer.write().await;
    writer_guard.write_all(response).await?;
    writer_guard.flush().await?;

    Ok(())
}

/// Sends the FULLRESYNC header and the empty-database snapshot framed as a
/// bulk (with no trailing CRLF after the blob), then registers the
/// connection as a replica so subsequent writes fan out to it.
async fn perform_full_resync(
    shared: &SharedState,
    client_address: &str,
    writer: &SubscriberWriter,
    header: &str,
) -> tokio::io::Result<()> {
    {
        let mut writer_guard = writer.write().await;
        writer_guard.write_all(header.as_bytes()).await?;
        writer_guard
            .write_all(format!("${}\r\n", EMPTY_RDB_SNAPSHOT.len()).as_bytes())
            .await?;
        writer_guard.write_all(EMPTY_RDB_SNAPSHOT).await?;
        writer_guard.flush().await?;
    }

    info!("full resync sent to {}", client_address);

    shared
        .replicas
        .write()
        .await
        .register(client_address.to_string(), Arc::clone(writer));

    Ok(())
}

/// Releases everything the connection registered: its replica slot and any
/// channel subscriptions.
async fn cleanup_session(shared: &SharedState, client_address: &str) {
    shared.replicas.write().await.detach(client_address);

    let mut pub_sub_guard = shared.pub_sub.write().await;

    for channel in pub_sub_guard.channels_for_client(client_address) {
        pub_sub_guard.unsubscribe(&channel, client_address);
    }
}
