use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use super::{ApiResult, AppState, AuthUser};
use crate::models::{Chat, ChatSummary, CreateChatRequest, Message, Page, PageRequest, SendMessageRequest};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/chats", post(open_chat).get(list_chats))
        .route("/api/chats/unread-count", get(unread_count))
        .route("/api/chats/{id}/messages", post(send_message).get(get_messages))
        .route("/api/chats/{id}/read", put(mark_as_read))
}

#[derive(Serialize)]
struct MarkReadResponse {
    updated: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UnreadCountResponse {
    unread_count: u64,
}

async fn open_chat(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(request): Json<CreateChatRequest>,
) -> ApiResult<(StatusCode, Json<Chat>)> {
    let chat = state.chats.open_chat(&caller, request, Utc::now())?;
    Ok((StatusCode::CREATED, Json(chat)))
}

async fn list_chats(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Json<Vec<ChatSummary>>> {
    Ok(Json(state.chats.list_chats(&caller)?))
}

async fn send_message(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(chat_id): Path<i64>,
    Json(request): Json<SendMessageRequest>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    let content = request.content.unwrap_or_default();
    let message = state.chats.send_message(&caller, chat_id, &content, Utc::now())?;
    Ok((StatusCode::CREATED, Json(message)))
}

async fn get_messages(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(chat_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<Page<Message>>> {
    Ok(Json(state.chats.get_messages(&caller, chat_id, page)?))
}

async fn mark_as_read(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(chat_id): Path<i64>,
) -> ApiResult<Json<MarkReadResponse>> {
    let updated = state.chats.mark_as_read(&caller, chat_id)?;
    Ok(Json(MarkReadResponse { updated }))
}

async fn unread_count(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Json<UnreadCountResponse>> {
    let unread_count = state.chats.unread_count(&caller)?;
    Ok(Json(UnreadCountResponse { unread_count }))
}
