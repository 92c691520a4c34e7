use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use crate::conversation::filter::{is_filter_intent, ConversationalFilter};
use crate::errors::PipelineError;
use crate::pipeline::SearchType;

use super::models::*;
use super::AppState;

/// Maps a handler's `anyhow::Error` to an HTTP response, giving the
/// pipeline-not-ready case (§7 taxonomy item 4) its own error code and
/// status instead of folding it into the generic failure code.
fn error_response(default_code: &'static str, e: anyhow::Error) -> (StatusCode, Json<ErrorResponse>) {
    if e.downcast_ref::<PipelineError>().is_some_and(|pe| matches!(pe, PipelineError::NotReady(_))) {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(ErrorResponse::new("pipeline_not_ready", e.to_string())));
    }
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(default_code, e.to_string())))
}

/// Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<StatusResponse> {
    let ready = state.pipeline.is_some();
    Json(StatusResponse {
        status: if ready { "healthy" } else { "degraded" }.to_string(),
        database: if ready { "connected" } else { "unavailable" }.to_string(),
        rerank_enabled: state.config.rerank_enabled,
    })
}

/// Search endpoint: runs one of keyword/vector/hybrid retrieval (with
/// re-rank layered on top when enabled) and returns the ranked results.
pub async fn search(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    match handle_search(&state, payload).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => Err(error_response("search_failed", e)),
    }
}

async fn handle_search(state: &AppState, payload: SearchRequest) -> anyhow::Result<SearchResponse> {
    if payload.query.trim().is_empty() {
        anyhow::bail!("query must not be empty");
    }
    let pipeline = state
        .pipeline
        .as_ref()
        .ok_or_else(|| PipelineError::NotReady("retrieval pipeline not initialized".into()))?;

    let start = Instant::now();
    let search_type: SearchType = payload.search_type.into();
    let outcome = pipeline.search(&payload.query, search_type, payload.top_k).await?;
    let duration_ms = start.elapsed().as_millis();

    let hybrid_weights = matches!(payload.search_type, ApiSearchType::Hybrid)
        .then(|| (state.config.vector_weight, state.config.keyword_weight));

    Ok(SearchResponse {
        query: payload.query,
        search_type: payload.search_type,
        top_k: payload.top_k,
        result_count: outcome.results.len(),
        duration_ms,
        results: outcome.results,
        metadata: SearchResponseMetadata { trace_id: Uuid::new_v4().to_string(), hybrid_weights },
    })
}

/// Chat endpoint: routes a conversational message either to the retrieval
/// pipeline or to the conversational filter, per the selection rule in the
/// design docs, and records the exchange.
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    match handle_chat(&state, payload).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => Err(error_response("chat_failed", e)),
    }
}

async fn handle_chat(state: &AppState, payload: ChatRequest) -> anyhow::Result<ChatResponse> {
    if payload.message.trim().is_empty() {
        anyhow::bail!("message must not be empty");
    }
    let pipeline = state
        .pipeline
        .as_ref()
        .ok_or_else(|| PipelineError::NotReady("retrieval pipeline not initialized".into()))?;

    let is_new_conversation = payload.conversation_id.is_none();
    let conversation_id = payload.conversation_id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());

    let manager_lock = state.conversations.entry(&conversation_id);
    let mut manager = manager_lock.lock().await;

    let use_filter = manager.has_results() && (is_filter_intent(&payload.message) || !is_new_conversation);

    let start = Instant::now();
    let (results, response_text, mode) = if use_filter {
        let cached: Vec<_> = manager.get_last_results().unwrap_or(&[]).to_vec();
        let filterer = ConversationalFilter::new(state.chat.as_ref());
        let outcome = filterer.filter(&payload.message, &cached).await;
        (outcome.results, outcome.summary, ChatSearchMode::Filter)
    } else {
        let outcome = pipeline.search(&payload.message, SearchType::Hybrid, payload.top_k).await?;
        let summary = outcome
            .analysis
            .map(|a| a.summary)
            .unwrap_or_else(|| format!("{} results found", outcome.results.len()));
        manager.set_last_results(outcome.results.clone());
        (outcome.results, summary, ChatSearchMode::Hybrid)
    };
    let duration_ms = start.elapsed().as_millis();

    manager.add_exchange(payload.message.clone(), response_text.clone(), Utc::now());
    let message_count = manager.message_count();

    Ok(ChatResponse {
        response: response_text,
        conversation_id,
        message_count,
        model: state.config.chat_model.clone(),
        provider: state.config.chat_provider.clone(),
        search_metadata: ChatSearchMetadata {
            query: payload.message,
            search_type: mode,
            result_count: results.len(),
            duration_ms,
        },
        search_results: results,
    })
}

/// History endpoint: returns the bounded message history for a conversation.
pub async fn history(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<HistoryResponse>, (StatusCode, Json<ErrorResponse>)> {
    if !state.conversations.exists(&conversation_id) {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("conversation_not_found", format!("no conversation with id {conversation_id}"))),
        ));
    }
    let manager_lock = state.conversations.entry(&conversation_id);
    let manager = manager_lock.lock().await;
    let messages = manager.messages();
    Ok(Json(HistoryResponse { conversation_id, message_count: messages.len(), messages }))
}

/// Delete endpoint: removes a conversation's history and cached results.
pub async fn delete(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<DeleteResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.conversations.remove(&conversation_id) {
        Ok(()) => Ok(Json(DeleteResponse { conversation_id, deleted: true })),
        Err(e) => Err((StatusCode::NOT_FOUND, Json(ErrorResponse::new("conversation_not_found", e.to_string())))),
    }
}
