//! One chat turn: validate, enrich, persist the user row, produce a reply,
//! persist the assistant row and queue the history entry.
//!
//! Failures before the user row is written abort the request. Everything
//! after it is lenient: model errors become visible reply text, and failed
//! assistant or history writes are only logged.

use std::convert::Infallible;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info, warn};

use crate::chat::attachments::resolve_attachments;
use crate::chat::canned::simulated_reply;
use crate::chat::category::ModelRoute;
use crate::chat::history::TurnRecord;
use crate::chat::prompts::{build_model_input, empty_reply, model_error_reply, model_suffix};
use crate::errors::AppError;
use crate::llm_client::{DeltaSink, LlmError};
use crate::models::message::{Message, MessageRole, NewMessage};
use crate::sanitize::sanitize_for_storage;
use crate::state::AppState;

const STREAM_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatRequest {
    pub user_id: String,
    pub thread_id: String,
    pub content: String,
    pub attachments: Vec<String>,
    pub model_id: String,
    pub deep_thinking: bool,
    pub network_search: bool,
}

/// A turn whose user row has been written.
struct OpenTurn {
    request: ChatRequest,
    enriched_content: String,
    user_message: Message,
    started: Instant,
}

pub type BodyStream = ReceiverStream<Result<Bytes, Infallible>>;

/// A streaming turn. `body` yields the reply text; `task` completes after the
/// assistant row and history entry have been handed off.
pub struct StreamingTurn {
    pub user_message: Message,
    pub body: BodyStream,
    pub task: JoinHandle<()>,
}

/// Non-streaming turn. Returns `[user, assistant]`; the assistant row has
/// `id == 0` when it could not be stored.
pub async fn send_message(
    state: &AppState,
    request: ChatRequest,
) -> Result<Vec<Message>, AppError> {
    let turn = open_turn(state, request).await?;
    let reply = generate_reply(state, &turn.request, &turn.enriched_content).await;
    let assistant = close_turn(state, &turn, reply).await;
    Ok(vec![turn.user_message, assistant])
}

/// Streaming turn. Validation and the user-row write happen before this
/// returns; the reply is produced on a spawned task.
pub async fn stream_message(
    state: &AppState,
    request: ChatRequest,
) -> Result<StreamingTurn, AppError> {
    let turn = open_turn(state, request).await?;
    let user_message = turn.user_message.clone();
    let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);

    let state = state.clone();
    let task = tokio::spawn(async move {
        let mut sink = TeeSink::new(tx);
        let reply = match ModelRoute::classify(&turn.request.model_id) {
            ModelRoute::Upstream => stream_upstream(&state, &turn, &mut sink).await,
            ModelRoute::Simulated => stream_simulated(&state, &turn, &mut sink).await,
        };
        // Close the body before the bookkeeping writes.
        drop(sink);
        close_turn(&state, &turn, reply).await;
    });

    Ok(StreamingTurn {
        user_message,
        body: ReceiverStream::new(rx),
        task,
    })
}

pub async fn list_messages(state: &AppState, thread_id: &str) -> Result<Vec<Message>, AppError> {
    Ok(state.store.list_messages(thread_id).await?)
}

async fn open_turn(state: &AppState, request: ChatRequest) -> Result<OpenTurn, AppError> {
    if request.user_id.trim().is_empty() {
        return Err(AppError::Validation("userId is required".to_string()));
    }
    if request.content.trim().is_empty() {
        return Err(AppError::Validation("content is required".to_string()));
    }

    let started = Instant::now();
    info!(
        "Chat turn: thread={}, model={}, content_len={}, attachments={}",
        request.thread_id,
        request.model_id,
        request.content.len(),
        request.attachments.len()
    );

    let resolved = resolve_attachments(
        state.store.as_ref(),
        &request.user_id,
        &request.content,
        &request.attachments,
    )
    .await;

    let user_message = state
        .store
        .insert_message(NewMessage {
            user_id: request.user_id.clone(),
            thread_id: request.thread_id.clone(),
            role: MessageRole::User,
            content: sanitize_for_storage(&resolved.enriched_content),
            attachments: resolved.tokens_json.as_deref().map(sanitize_for_storage),
        })
        .await
        .map_err(|e| {
            error!("Failed to save user message: {e}");
            e
        })?;

    Ok(OpenTurn {
        request,
        enriched_content: resolved.enriched_content,
        user_message,
        started,
    })
}

async fn generate_reply(state: &AppState, request: &ChatRequest, enriched_content: &str) -> String {
    let model_id = request.model_id.as_str();
    match ModelRoute::classify(model_id) {
        ModelRoute::Upstream => {
            let input = upstream_input(request, enriched_content);
            match state
                .llm
                .send_message(model_id, &input, &request.attachments)
                .await
            {
                Ok(completion) => match completion.text() {
                    Some(text) => format!("{text}{}", model_suffix(model_id)),
                    None => {
                        warn!("Model {model_id} returned no choices");
                        empty_reply(model_id)
                    }
                },
                Err(e) => {
                    error!("Model call failed: model={model_id}, error={e}");
                    model_error_reply(&e, model_id)
                }
            }
        }
        ModelRoute::Simulated => simulated_reply(
            &request.thread_id,
            &request.content,
            model_id,
            request.deep_thinking,
            request.network_search,
        ),
    }
}

fn upstream_input(request: &ChatRequest, enriched_content: &str) -> String {
    build_model_input(
        &request.model_id,
        request.deep_thinking,
        request.network_search,
        &request.content,
        enriched_content,
    )
}

async fn stream_upstream(state: &AppState, turn: &OpenTurn, sink: &mut TeeSink) -> String {
    let request = &turn.request;
    let input = upstream_input(request, &turn.enriched_content);
    let result = state
        .llm
        .send_stream_message(&request.model_id, &input, &request.attachments, sink)
        .await;

    match result {
        Ok(()) => {}
        Err(LlmError::SinkClosed) => {
            info!("Client went away during stream: thread={}", request.thread_id)
        }
        Err(e) => {
            error!("Streaming model call failed: model={}, error={e}", request.model_id);
            let line = model_error_reply(&e, &request.model_id);
            // The client may already be gone; the buffer still gets the line.
            let _ = sink.write_delta(&line).await;
        }
    }
    sink.take_buffer()
}

/// Emits the canned reply word by word. The full reply is persisted even if
/// the client disconnects early.
async fn stream_simulated(state: &AppState, turn: &OpenTurn, sink: &mut TeeSink) -> String {
    let request = &turn.request;
    let reply = simulated_reply(
        &request.thread_id,
        &request.content,
        &request.model_id,
        request.deep_thinking,
        request.network_search,
    );

    for (i, word) in reply.split_whitespace().enumerate() {
        let chunk = if i == 0 {
            word.to_string()
        } else {
            format!(" {word}")
        };
        if sink.write_delta(&chunk).await.is_err() {
            info!("Client went away during simulated stream: thread={}", request.thread_id);
            break;
        }
        tokio::time::sleep(state.config.simulated_stream_delay).await;
    }
    reply
}

async fn close_turn(state: &AppState, turn: &OpenTurn, reply: String) -> Message {
    let request = &turn.request;
    let new_message = NewMessage {
        user_id: request.user_id.clone(),
        thread_id: request.thread_id.clone(),
        role: MessageRole::Assistant,
        content: sanitize_for_storage(&reply),
        attachments: None,
    };

    let assistant = match state.store.insert_message(new_message.clone()).await {
        Ok(message) => message,
        Err(e) => {
            error!("Failed to save assistant reply: thread={}, error={e}", request.thread_id);
            new_message.unsaved()
        }
    };

    state.history.record(TurnRecord {
        user_id: request.user_id.clone(),
        thread_id: request.thread_id.clone(),
        user_text: request.content.clone(),
        reply,
        model_id: request.model_id.clone(),
        attachments: request.attachments.clone(),
    });

    info!(
        "Chat turn finished: thread={}, elapsed={:?}",
        request.thread_id,
        turn.started.elapsed()
    );
    assistant
}

/// Forwards deltas to the HTTP body and keeps a copy of everything written.
struct TeeSink {
    tx: mpsc::Sender<Result<Bytes, Infallible>>,
    buffer: String,
}

impl TeeSink {
    fn new(tx: mpsc::Sender<Result<Bytes, Infallible>>) -> Self {
        Self {
            tx,
            buffer: String::new(),
        }
    }

    fn take_buffer(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}

#[async_trait]
impl DeltaSink for TeeSink {
    async fn write_delta(&mut self, text: &str) -> Result<(), LlmError> {
        self.buffer.push_str(text);
        self.tx
            .send(Ok(Bytes::from(text.to_string())))
            .await
            .map_err(|_| LlmError::SinkClosed)
    }
}
