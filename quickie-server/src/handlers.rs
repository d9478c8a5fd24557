use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::error::ApiError;
use crate::state::{AppState, ChatRequest, ChatResponse, HistoryResponse, RootResponse};

pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Hello World".to_string(),
    })
}

pub async fn chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!("Rejected chat request body: {}", rejection.body_text());
        ApiError::BadRequest(rejection.body_text())
    })?;

    let session = state.resolver.resolve_or_mint(&headers);
    let reply = state
        .chat
        .send_message(&session.token, &payload.prompt)
        .await
        .map_err(|e| report(&state, e))?;

    let mut out = HeaderMap::new();
    if session.minted {
        state.resolver.set_cookie(&mut out, &reply.session_id);
    }

    Ok((
        out,
        Json(ChatResponse {
            response: reply.response,
            session_id: reply.session_id,
        }),
    )
        .into_response())
}

pub async fn history_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<HistoryResponse>, ApiError> {
    let token = state.resolver.lookup(&headers);
    let history = state
        .chat
        .fetch_history(token.as_deref())
        .await
        .map_err(|e| report(&state, e))?;

    Ok(Json(match history {
        Some(history) => HistoryResponse::Found {
            history: history.into_turns(),
        },
        None => HistoryResponse::empty(),
    }))
}

/// Log a failed request and apply the configured redaction
fn report(state: &AppState, err: ApiError) -> ApiError {
    match &err {
        ApiError::BadRequest(detail) => warn!("Chat request rejected: {}", detail),
        other => error!("Chat request failed: {}", other),
    }
    if state.config.server.redact_errors {
        err.redacted()
    } else {
        err
    }
}
