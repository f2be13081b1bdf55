//! SSE consumption for streamed completions.
//!
//! The body is parsed with `eventsource-stream`. Each event payload is decoded
//! on its own; payloads that fail to decode are skipped, `[DONE]` or a
//! populated `finish_reason` ends the stream.

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use serde::Deserialize;
use tracing::debug;

use super::LlmError;

const DONE_MARKER: &str = "[DONE]";

/// Receives streamed text as it arrives.
#[async_trait]
pub trait DeltaSink: Send {
    /// Fails with `LlmError::SinkClosed` once the reader has gone away.
    async fn write_delta(&mut self, text: &str) -> Result<(), LlmError>;
}

#[async_trait]
impl DeltaSink for String {
    async fn write_delta(&mut self, text: &str) -> Result<(), LlmError> {
        self.push_str(text);
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, PartialEq)]
enum StreamStep {
    Delta { text: String, finished: bool },
    Skip,
    Done,
}

fn interpret_payload(payload: &str) -> StreamStep {
    let payload = payload.trim();
    if payload.is_empty() {
        return StreamStep::Skip;
    }
    if payload == DONE_MARKER {
        return StreamStep::Done;
    }

    let chunk: StreamChunk = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(e) => {
            debug!("Skipping malformed stream chunk: {e}");
            return StreamStep::Skip;
        }
    };

    match chunk.choices.into_iter().next() {
        Some(choice) => StreamStep::Delta {
            text: choice.delta.content.unwrap_or_default(),
            finished: choice.finish_reason.is_some_and(|r| !r.is_empty()),
        },
        None => StreamStep::Skip,
    }
}

pub(super) async fn pump_deltas(
    response: reqwest::Response,
    sink: &mut dyn DeltaSink,
) -> Result<(), LlmError> {
    let mut events = response.bytes_stream().eventsource();

    while let Some(event) = events.next().await {
        let event = event.map_err(|e| LlmError::Stream(e.to_string()))?;

        // Gateways that omit the blank line between events get their
        // payloads merged into one multi-line data field.
        for payload in event.data.lines() {
            match interpret_payload(payload) {
                StreamStep::Done => return Ok(()),
                StreamStep::Skip => {}
                StreamStep::Delta { text, finished } => {
                    if !text.is_empty() {
                        sink.write_delta(&text).await?;
                    }
                    if finished {
                        return Ok(());
                    }
                }
            }
        }
    }
    Ok(())
}
