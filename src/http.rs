//! HTTP gateway — REST endpoints plus the static browser client.
//!
//! Handlers only translate shapes and validate input; everything else is
//! delegated to the chat service and the store.

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeFile;
use tracing::{error, warn};

use crate::chat::ChatService;
use crate::error::{ChatError, CompletionError, StoreError};
use crate::store::{Store, StoredExchange};

/// Application state shared across handlers.
///
/// Constructed once at startup and injected; handlers hold no other state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub chat: Arc<ChatService>,
}

/// Build the Axum router with the chat API and static client routes.
pub fn chat_routes(state: AppState, asset_dir: &FsPath) -> Router {
    Router::new()
        .route_service("/", ServeFile::new(asset_dir.join("index.html")))
        .route_service("/script.js", ServeFile::new(asset_dir.join("script.js")))
        .route("/api/chats", get(list_chats))
        .route("/api/chats/{name}", get(chat_history).post(add_message))
        .route("/api/messages/{id}/like", post(like_message))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Handlers ────────────────────────────────────────────────────────────

async fn list_chats(State(state): State<AppState>) -> Response {
    match state.store.list_personalities().await {
        Ok(personalities) => Json(personalities).into_response(),
        Err(e) => store_error(e),
    }
}

async fn chat_history(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    // Canonicalize known personas so mixed-case URLs read the same history;
    // unknown names fall through and simply yield an empty list.
    let name = state
        .chat
        .registry()
        .find(&name)
        .map(|p| p.name.clone())
        .unwrap_or(name);

    match state.store.history(&name).await {
        Ok(history) => Json(history_entries(&history)).into_response(),
        Err(e) => store_error(e),
    }
}

#[derive(Deserialize)]
struct AskRequest {
    content: String,
}

async fn add_message(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: String,
) -> Response {
    let Ok(request) = serde_json::from_str::<AskRequest>(&body) else {
        return (StatusCode::BAD_REQUEST, "Invalid JSON").into_response();
    };

    let exchange = match state.chat.respond(&name, &request.content).await {
        Ok(exchange) => exchange,
        Err(e) => return chat_error(e),
    };

    match state
        .store
        .save_message(&exchange.personality, &exchange.input, &exchange.response)
        .await
    {
        Ok(id) => Json(json!({
            "role": "assistant",
            "content": exchange.response,
            "id": id,
            "liked": false,
        }))
        .into_response(),
        Err(e) => store_error(e),
    }
}

async fn like_message(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Ok(message_id) = id.parse::<i64>() else {
        return (StatusCode::BAD_REQUEST, "Invalid message ID").into_response();
    };

    match state.store.toggle_like(message_id).await {
        Ok(liked) => Json(json!({ "liked": liked })).into_response(),
        Err(e) => store_error(e),
    }
}

// ── Shape translation ───────────────────────────────────────────────────

/// Reshape stored exchanges into the alternating per-side entries the
/// browser client consumes. Only assistant entries carry id and liked.
fn history_entries(history: &[StoredExchange]) -> Vec<serde_json::Value> {
    let mut entries = Vec::with_capacity(history.len() * 2);
    for exchange in history {
        entries.push(json!({
            "role": "user",
            "content": exchange.input,
        }));
        entries.push(json!({
            "role": "assistant",
            "content": exchange.response,
            "id": exchange.id,
            "liked": exchange.liked,
        }));
    }
    entries
}

// ── Error mapping ───────────────────────────────────────────────────────

fn chat_error(e: ChatError) -> Response {
    match e {
        ChatError::UnknownPersonality(name) => {
            warn!(personality = %name, "Request for unknown personality");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": format!("Unknown personality: {name}")})),
            )
                .into_response()
        }
        ChatError::Completion(e) => completion_error(e),
        ChatError::Store(e) => store_error(e),
    }
}

fn completion_error(e: CompletionError) -> Response {
    warn!(error = %e, "Completion call failed");
    let status = match e {
        CompletionError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    };
    (status, Json(json!({"error": e.to_string()}))).into_response()
}

fn store_error(e: StoreError) -> Response {
    error!(error = %e, "Store operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "storage failure"})),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_entries_alternate_user_then_assistant() {
        let history = vec![
            StoredExchange {
                id: 1,
                input: "hi".into(),
                response: "hello".into(),
                liked: true,
            },
            StoredExchange {
                id: 2,
                input: "more".into(),
                response: "sure".into(),
                liked: false,
            },
        ];

        let entries = history_entries(&history);
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0], json!({"role": "user", "content": "hi"}));
        assert_eq!(
            entries[1],
            json!({"role": "assistant", "content": "hello", "id": 1, "liked": true})
        );
        assert_eq!(entries[2]["role"], "user");
        assert_eq!(entries[3]["id"], 2);
        // User entries never carry an id.
        assert!(entries[0].get("id").is_none());
    }
}
