//! HTTP request handlers

use super::types::{
    ActivateResponse, CompletionRequest, CompletionResponse, ConversationListResponse,
    ConversationResponse, ConversationSummary, DeleteResponse, ErrorResponse, SendRequest,
    SendResponse, SessionResponse,
};
use super::AppState;
use crate::chat::send_message;
use crate::gateway::WireRole;
use crate::store::StoreError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Fixed 400 payload of the completion route for an empty or invalid
/// message array
const INVALID_MESSAGES_ERROR: &str = "请提供有效的消息数组";

/// Fixed 500 payload of the completion route for any provider failure
const COMPLETION_FAILED_ERROR: &str = "与AI助手通信时出错";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Session bootstrap
        .route("/api/session", get(get_session))
        // Conversation listing
        .route("/api/conversations", get(list_conversations))
        // Conversation creation
        .route("/api/conversations/new", post(create_conversation))
        // Conversation retrieval
        .route("/api/conversations/:id", get(get_conversation))
        // Active pointer
        .route("/api/conversations/:id/activate", post(activate_conversation))
        // Lifecycle
        .route("/api/conversations/:id/delete", post(delete_conversation))
        // Send orchestration (append, complete, append reply)
        .route("/api/conversations/:id/chat", post(send_chat))
        // Stateless completion (the original's chat route, unchanged)
        .route("/api/chat", post(complete))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Session
// ============================================================

async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let session = state.store.snapshot();

    Json(SessionResponse {
        conversations: session.conversations,
        active_conversation_id: session.active_conversation_id,
    })
}

// ============================================================
// Conversation Listing
// ============================================================

async fn list_conversations(State(state): State<AppState>) -> Json<ConversationListResponse> {
    let session = state.store.snapshot();

    let conversations = session
        .conversations
        .iter()
        .map(ConversationSummary::from)
        .collect();

    Json(ConversationListResponse { conversations })
}

// ============================================================
// Conversation Creation
// ============================================================

async fn create_conversation(State(state): State<AppState>) -> Json<ConversationResponse> {
    let conversation = state.store.create_conversation();

    Json(ConversationResponse { conversation })
}

// ============================================================
// Conversation Retrieval
// ============================================================

async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationResponse>, AppError> {
    let conversation = state
        .store
        .conversation(&id)
        .map_err(|e| AppError::NotFound(e.to_string()))?;

    Ok(Json(ConversationResponse { conversation }))
}

// ============================================================
// Active Pointer
// ============================================================

async fn activate_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<ActivateResponse> {
    let activated = state.store.set_active(&id);

    Json(ActivateResponse { activated })
}

// ============================================================
// Lifecycle
// ============================================================

async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<DeleteResponse> {
    let deleted = state.store.delete_conversation(&id);

    Json(DeleteResponse {
        deleted,
        active_conversation_id: state.store.active_conversation_id(),
    })
}

// ============================================================
// Send Orchestration
// ============================================================

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SendRequest>,
) -> Result<Json<SendResponse>, AppError> {
    let outcome = send_message(&state.store, state.gateway.as_ref(), &id, &req.text)
        .await
        .map_err(|e| match e {
            StoreError::InvalidInput(msg) => AppError::BadRequest(msg),
            StoreError::ConversationNotFound(id) => {
                AppError::NotFound(format!("Conversation not found: {id}"))
            }
            other => AppError::Internal(other.to_string()),
        })?;

    Ok(Json(SendResponse {
        user_message: outcome.user_message,
        reply: outcome.reply,
    }))
}

// ============================================================
// Stateless Completion
// ============================================================

/// The original completion route: one history in, one reply out. Error
/// payloads are the fixed conversation-language strings; raw provider
/// errors are logged, never returned.
async fn complete(
    State(state): State<AppState>,
    Json(req): Json<CompletionRequest>,
) -> Result<Json<CompletionResponse>, AppError> {
    if req.messages.is_empty() {
        return Err(AppError::BadRequest(INVALID_MESSAGES_ERROR.to_string()));
    }

    let reply = state
        .gateway
        .complete(&req.messages)
        .await
        .map_err(|e| {
            tracing::error!(kind = ?e.kind, error = %e.message, "Completion route failed");
            AppError::Internal(COMPLETION_FAILED_ERROR.to_string())
        })?;

    Ok(Json(CompletionResponse {
        content: reply.content,
        role: WireRole::from(reply.role),
    }))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("ember-chat ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
