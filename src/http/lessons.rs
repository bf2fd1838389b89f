use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;

use super::{ApiResult, AppState, AuthUser};
use crate::models::{CreateLessonRequest, Lesson, UpdateLessonRequest};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/lessons", get(list_active).post(create_lesson))
        .route("/api/lessons/upcoming", get(list_upcoming))
        .route("/api/lessons/my-lessons", get(my_lessons))
        .route("/api/lessons/admin/all", get(list_all))
        .route("/api/lessons/teacher/{teacher_id}", get(list_by_teacher))
        .route(
            "/api/lessons/{id}",
            get(get_lesson).put(update_lesson).patch(update_lesson).delete(delete_lesson),
        )
        .route("/api/lessons/{id}/cancel", put(cancel_lesson))
        .route("/api/lessons/{id}/reactivate", put(reactivate_lesson))
}

async fn list_active(State(state): State<AppState>, _caller: AuthUser) -> ApiResult<Json<Vec<Lesson>>> {
    Ok(Json(state.lessons.list_active()?))
}

async fn list_upcoming(State(state): State<AppState>, _caller: AuthUser) -> ApiResult<Json<Vec<Lesson>>> {
    Ok(Json(state.lessons.list_upcoming(Utc::now())?))
}

async fn my_lessons(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Json<Vec<Lesson>>> {
    Ok(Json(state.lessons.my_lessons(&caller)?))
}

async fn list_all(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Json<Vec<Lesson>>> {
    Ok(Json(state.lessons.list_all(&caller)?))
}

async fn list_by_teacher(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(teacher_id): Path<i64>,
) -> ApiResult<Json<Vec<Lesson>>> {
    Ok(Json(state.lessons.list_by_teacher(teacher_id)?))
}

async fn get_lesson(State(state): State<AppState>, _caller: AuthUser, Path(id): Path<i64>) -> ApiResult<Json<Lesson>> {
    Ok(Json(state.lessons.get_active(id)?))
}

async fn create_lesson(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(request): Json<CreateLessonRequest>,
) -> ApiResult<(StatusCode, Json<Lesson>)> {
    let lesson = state.lessons.create_lesson(&caller, request, Utc::now())?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

async fn update_lesson(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateLessonRequest>,
) -> ApiResult<Json<Lesson>> {
    Ok(Json(state.lessons.update_lesson(&caller, id, request)?))
}

async fn cancel_lesson(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Lesson>> {
    Ok(Json(state.lessons.cancel_lesson(&caller, id)?))
}

async fn reactivate_lesson(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Lesson>> {
    Ok(Json(state.lessons.reactivate_lesson(&caller, id)?))
}

async fn delete_lesson(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.lessons.delete_lesson(&caller, id)?;
    Ok(StatusCode::NO_CONTENT)
}
