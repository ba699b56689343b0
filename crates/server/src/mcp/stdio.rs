//! Newline-delimited JSON-RPC over a byte stream.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::mcp::handler::handle_message;
use crate::state::AppState;

/// Serve messages from `reader` until EOF, writing one response line per
/// request. Blank lines are skipped; notifications produce no output.
pub async fn serve<R, W>(state: &AppState, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(response) = handle_message(state, line).await {
            let mut encoded = serde_json::to_vec(&response)?;
            encoded.push(b'\n');
            writer.write_all(&encoded).await?;
            writer.flush().await?;
        }
    }
    tracing::info!("Input closed, stopping stdio transport");
    Ok(())
}

/// Serve on the process's stdin and stdout. Logs go to stderr.
pub async fn serve_stdio(state: &AppState) -> std::io::Result<()> {
    tracing::info!("Serving JSON-RPC on stdio");
    serve(state, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}
