use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::{provider::WeatherProvider, rpc::Dispatcher};

/// Run the MCP server over stdio: one JSON message per line on stdin, one
/// response per line on stdout. Notifications produce no output. Logs go to
/// stderr so stdout stays a clean protocol channel.
pub async fn serve(provider: Arc<dyn WeatherProvider>) -> Result<()> {
    let dispatcher = Dispatcher::new(provider);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    info!("stdio transport started");

    while let Some(line) = lines.next_line().await.context("failed to read frame from stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        debug!(frame = %line, "received frame");

        if let Some(response) = dispatcher.handle_message(&line).await {
            let encoded =
                serde_json::to_string(&response).context("failed to encode response frame")?;
            stdout
                .write_all(encoded.as_bytes())
                .await
                .context("failed to write response to stdout")?;
            stdout.write_all(b"\n").await.context("failed to write frame delimiter")?;
            stdout.flush().await.context("failed to flush stdout")?;
        }
    }

    info!("stdin closed, stdio transport stopping");
    Ok(())
}
