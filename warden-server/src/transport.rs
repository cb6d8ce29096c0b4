//! warden-server/src/transport.rs
//!
//! JSON-lines transport: one `InboundEvent` per input line, one
//! `OutboundAction` per output line.

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::debug;

use warden_common::models::{InboundEvent, OutboundAction};
use warden_core::services::ActionExecutor;
use warden_core::Error;

/// Writes each action as a single JSON line. Lines from concurrent tasks
/// never interleave.
pub struct JsonLinesExecutor<W> {
    out: Mutex<W>,
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesExecutor<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> ActionExecutor for JsonLinesExecutor<W> {
    async fn execute(&self, action: &OutboundAction) -> Result<(), Error> {
        if action.is_noop() {
            return Ok(());
        }
        let mut line = serde_json::to_vec(action)?;
        line.push(b'\n');

        let mut out = self.out.lock().await;
        out.write_all(&line).await?;
        out.flush().await?;
        debug!(chat_id = action.chat_id, "Outbound action written");
        Ok(())
    }
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_event(line: &str) -> Result<Option<InboundEvent>, Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let de = &mut serde_json::Deserializer::from_str(line);
    let event: InboundEvent = serde_path_to_error::deserialize(de)
        .map_err(|e| Error::Parse(format!("bad inbound event at '{}': {}", e.path(), e.inner())))?;
    Ok(Some(event))
}
