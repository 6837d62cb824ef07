//! Plumbing between an initiator and a renderer.
//!
//! In-process the two sides talk over unbounded tokio channels. Across
//! processes each message is a JSON line on a pipe; `forward_lines` writes a
//! channel out and the `pump_*_lines` functions read one in.

use crate::error::Result;
use crate::protocol::{decode_client_line, decode_server_line, encode_line, ClientMessage, ServerMessage};
use crate::reporter::Reporter;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::UnboundedReceiver;

/// Feeds a renderer until the channel closes.
pub async fn pump_client_messages(reporter: Reporter, mut rx: UnboundedReceiver<ClientMessage>) {
    while let Some(message) = rx.recv().await {
        if let Err(e) = reporter.receive_client_message(message) {
            tracing::error!("dropping progress message: {}", e);
        }
    }
}

/// Feeds an initiator until the channel closes.
pub async fn pump_server_messages(reporter: Reporter, mut rx: UnboundedReceiver<ServerMessage>) {
    while let Some(message) = rx.recv().await {
        reporter.receive_server_message(message);
    }
}

pub async fn pump_client_lines<R: AsyncBufRead + Unpin>(reporter: Reporter, reader: R) -> Result<()> {
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if let Err(e) = decode_client_line(&line).and_then(|m| reporter.receive_client_message(m)) {
            tracing::error!("dropping progress message: {}", e);
        }
    }
    Ok(())
}

pub async fn pump_server_lines<R: AsyncBufRead + Unpin>(reporter: Reporter, reader: R) -> Result<()> {
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match decode_server_line(&line) {
            Ok(message) => reporter.receive_server_message(message),
            Err(e) => tracing::error!("dropping progress notification: {}", e),
        }
    }
    Ok(())
}

/// Writes every message of `rx` as a JSON line, in order, until the channel
/// closes.
pub async fn forward_lines<T, W>(mut rx: UnboundedReceiver<T>, mut writer: W) -> Result<()>
where
    T: Serialize,
    W: AsyncWrite + Unpin,
{
    while let Some(message) = rx.recv().await {
        let line = encode_line(&message)?;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    writer.shutdown().await?;
    Ok(())
}
