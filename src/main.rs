use std::process::ExitCode;

use tracing::error;

use rudis::server::RedisServer;

/// Parses the command line, initializes logging and runs the server. Exits
/// non-zero when the flags are invalid, the listener cannot bind, or a
/// configured primary is unreachable.
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let server = match RedisServer::new(std::env::args()) {
        Ok(server) => server,
        Err(e) => {
            error!("invalid command line: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.run().await {
        error!("server failed: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
