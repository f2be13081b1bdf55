use axum::{
    body::Body,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::chat::orchestrator::{self, ChatRequest};
use crate::errors::AppError;
use crate::models::message::Message;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageListQuery {
    #[serde(default)]
    pub thread_id: String,
}

#[derive(Serialize)]
pub struct ModelListResponse {
    pub models: Vec<&'static str>,
}

/// POST /api/messages
///
/// Returns `[userMessage, assistantMessage]`.
pub async fn handle_send_message(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<Vec<Message>>, AppError> {
    let messages = orchestrator::send_message(&state, request).await?;
    Ok(Json(messages))
}

/// POST /api/messages/stream
///
/// Plain-text body that grows as the reply is produced.
pub async fn handle_stream_message(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let turn = orchestrator::stream_message(&state, request).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(turn.body),
    ))
}

/// GET /api/messages?threadId=
pub async fn handle_list_messages(
    State(state): State<AppState>,
    Query(params): Query<MessageListQuery>,
) -> Result<Json<Vec<Message>>, AppError> {
    let messages = orchestrator::list_messages(&state, &params.thread_id).await?;
    Ok(Json(messages))
}

/// GET /api/models
pub async fn handle_list_models(State(state): State<AppState>) -> Json<ModelListResponse> {
    Json(ModelListResponse {
        models: state.llm.list_models().to_vec(),
    })
}
