//! Chat surface and the event loop that feeds it.

use std::io::{ErrorKind, Read};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, DuplexStream};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::agent::{Session, TurnHandler};
use crate::error::{ParleyError, Result};

/// Where assistant output goes.
#[async_trait]
pub trait ChatSurface: Send + Sync {
    /// Deliver one message to the current session.
    async fn send(&self, text: &str) -> Result<()>;
}

/// Writes each message as one line to an async writer.
pub struct TerminalSurface<W> {
    writer: Mutex<W>,
    prefix: String,
}

impl TerminalSurface<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> TerminalSurface<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            prefix: String::new(),
        }
    }

    /// Prepend `prefix` to every message, e.g. `"tutor> "`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W> ChatSurface for TerminalSurface<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&self, text: &str) -> Result<()> {
        let mut writer = self.writer.lock().await;
        writer
            .write_all(format!("{}{}\n", self.prefix, text).as_bytes())
            .await?;
        writer.flush().await?;
        Ok(())
    }
}

const INPUT_BUFFER: usize = 8 * 1024;

/// Pump a blocking reader into an async stream from a dedicated thread.
///
/// A read still blocked when the chat loop ends is left on that thread and
/// does not hold up runtime shutdown, which `tokio::io::stdin()` would.
/// Must be called from within a tokio runtime.
pub fn detached_reader<R>(mut source: R) -> Result<DuplexStream>
where
    R: Read + Send + 'static,
{
    let handle = tokio::runtime::Handle::try_current()
        .map_err(|e| ParleyError::InvalidState(format!("no tokio runtime: {e}")))?;
    let (mut writer, reader) = tokio::io::duplex(INPUT_BUFFER);

    std::thread::Builder::new()
        .name("parley-input".into())
        .spawn(move || {
            let mut buf = vec![0u8; INPUT_BUFFER];
            loop {
                let n = match source.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        warn!(error = %e, "input read failed");
                        break;
                    }
                };
                // Fails once the chat loop has dropped its end.
                if handle.block_on(writer.write_all(&buf[..n])).is_err() {
                    break;
                }
            }
            debug!("input closed");
        })?;

    Ok(reader)
}

/// Run one chat session over line-oriented input.
///
/// Each non-blank line is one user turn. A failed turn is reported to the
/// surface as `Error: ...` and the session continues with its previous
/// history. The loop ends at end of input or when `cancel` fires, and
/// returns the final session.
pub async fn run_chat<R>(
    handler: &TurnHandler,
    input: R,
    surface: &dyn ChatSurface,
    cancel: CancellationToken,
) -> Result<Session>
where
    R: AsyncRead + Unpin,
{
    let mut session = handler.on_chat_start(surface).await?;
    let mut lines = BufReader::new(input).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = cancel.cancelled() => break,
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        match handler.on_message(&session, &line, surface, &cancel).await {
            Ok(next) => session = next,
            Err(ParleyError::Cancelled) => break,
            Err(e) => {
                error!(session = %session.id(), error = %e, "turn failed");
                surface.send(&format!("Error: {e}")).await?;
            }
        }
    }

    info!(session = %session.id(), turns = session.turns(), "session ended");
    Ok(session)
}
