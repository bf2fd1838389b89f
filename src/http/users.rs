use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::{blocking, ApiResult, AppState, AuthUser};
use crate::models::{RegisterUserRequest, UpdateUserRequest, User};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", post(register).get(list_users))
        .route("/api/users/register", post(register))
        .route("/api/users/me", get(me))
        .route("/api/users/{id}", get(get_user).patch(update_user))
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let users = state.users.clone();
    let user = blocking(move || users.register(request)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn list_users(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.users.list_users(&caller)?))
}

async fn me(AuthUser(caller): AuthUser) -> Json<User> {
    Json(caller)
}

async fn get_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.users.get_user(id)?))
}

async fn update_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    let users = state.users.clone();
    let user = blocking(move || users.update_user(&caller, id, request)).await?;
    Ok(Json(user))
}
