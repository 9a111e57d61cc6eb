//! HTTP endpoints for quiz submission and routine reads/mutations.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{NoteId, RoutineId};
use super::repository::{RepositoryError, RoutineRepository};
use super::service::{RoutineService, RoutineServiceError};
use crate::accounts::{AccountStore, UserId};
use crate::catalog::ProductCategory;
use crate::quiz::QuizAnswers;

/// Caller identity comes from a header set by the session layer upstream;
/// auth plumbing itself is outside this crate.
pub(crate) fn require_user(headers: &HeaderMap) -> Result<UserId, Response> {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .map(|value| UserId::new(value.trim()))
        .ok_or_else(|| {
            let payload = json!({ "error": "missing x-user-id header" });
            (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
        })
}

fn error_response(error: RoutineServiceError) -> Response {
    match &error {
        RoutineServiceError::NoMatch => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        RoutineServiceError::NotFound
        | RoutineServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "routine not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        _ => {
            tracing::error!(error = %error, "routine service failure");
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct SetProductRequest {
    category: ProductCategory,
    product_name: String,
}

#[derive(Debug, Deserialize)]
struct AddNoteRequest {
    text: String,
}

/// Router builder exposing the quiz and routine endpoints.
pub fn routine_router<R, S>(service: Arc<RoutineService<R, S>>) -> Router
where
    R: RoutineRepository + 'static,
    S: AccountStore + 'static,
{
    Router::new()
        .route("/api/v1/quiz/submit", post(submit_quiz_handler::<R, S>))
        .route("/api/v1/routines", get(list_handler::<R, S>))
        .route("/api/v1/routines/current", get(current_handler::<R, S>))
        .route("/api/v1/routines/:routine_id", get(get_handler::<R, S>))
        .route(
            "/api/v1/routines/:routine_id/set-product",
            post(set_product_handler::<R, S>),
        )
        .route(
            "/api/v1/routines/:routine_id/set-current",
            post(set_current_handler::<R, S>),
        )
        .route(
            "/api/v1/routines/:routine_id/add-note",
            post(add_note_handler::<R, S>),
        )
        .route(
            "/api/v1/routines/:routine_id/notes/:note_id",
            delete(delete_note_handler::<R, S>),
        )
        .route(
            "/api/v1/user/entitlements",
            get(entitlements_handler::<R, S>),
        )
        .with_state(service)
}

async fn submit_quiz_handler<R, S>(
    State(service): State<Arc<RoutineService<R, S>>>,
    headers: HeaderMap,
    Json(answers): Json<QuizAnswers>,
) -> Response
where
    R: RoutineRepository + 'static,
    S: AccountStore + 'static,
{
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    match service.submit_quiz(&user_id, answers, Utc::now()) {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn list_handler<R, S>(
    State(service): State<Arc<RoutineService<R, S>>>,
    headers: HeaderMap,
) -> Response
where
    R: RoutineRepository + 'static,
    S: AccountStore + 'static,
{
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    match service.list(&user_id, Utc::now()) {
        Ok(views) => (StatusCode::OK, Json(views)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn current_handler<R, S>(
    State(service): State<Arc<RoutineService<R, S>>>,
    headers: HeaderMap,
) -> Response
where
    R: RoutineRepository + 'static,
    S: AccountStore + 'static,
{
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    match service.current(&user_id, Utc::now()) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn get_handler<R, S>(
    State(service): State<Arc<RoutineService<R, S>>>,
    headers: HeaderMap,
    Path(routine_id): Path<String>,
) -> Response
where
    R: RoutineRepository + 'static,
    S: AccountStore + 'static,
{
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    match service.get(&user_id, &RoutineId(routine_id), Utc::now()) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn set_product_handler<R, S>(
    State(service): State<Arc<RoutineService<R, S>>>,
    headers: HeaderMap,
    Path(routine_id): Path<String>,
    Json(request): Json<SetProductRequest>,
) -> Response
where
    R: RoutineRepository + 'static,
    S: AccountStore + 'static,
{
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    match service.set_product(
        &user_id,
        &RoutineId(routine_id),
        request.category,
        request.product_name,
        Utc::now(),
    ) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn set_current_handler<R, S>(
    State(service): State<Arc<RoutineService<R, S>>>,
    headers: HeaderMap,
    Path(routine_id): Path<String>,
) -> Response
where
    R: RoutineRepository + 'static,
    S: AccountStore + 'static,
{
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    match service.set_current(&user_id, &RoutineId(routine_id)) {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(error) => error_response(error),
    }
}

async fn add_note_handler<R, S>(
    State(service): State<Arc<RoutineService<R, S>>>,
    headers: HeaderMap,
    Path(routine_id): Path<String>,
    Json(request): Json<AddNoteRequest>,
) -> Response
where
    R: RoutineRepository + 'static,
    S: AccountStore + 'static,
{
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    match service.add_note(&user_id, &RoutineId(routine_id), request.text, Utc::now()) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn delete_note_handler<R, S>(
    State(service): State<Arc<RoutineService<R, S>>>,
    headers: HeaderMap,
    Path((routine_id, note_id)): Path<(String, String)>,
) -> Response
where
    R: RoutineRepository + 'static,
    S: AccountStore + 'static,
{
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    match service.delete_note(&user_id, &RoutineId(routine_id), &NoteId(note_id)) {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(error) => error_response(error),
    }
}

async fn entitlements_handler<R, S>(
    State(service): State<Arc<RoutineService<R, S>>>,
    headers: HeaderMap,
) -> Response
where
    R: RoutineRepository + 'static,
    S: AccountStore + 'static,
{
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    match service.entitlements(&user_id, Utc::now()) {
        Ok(entitlements) => (StatusCode::OK, Json(entitlements)).into_response(),
        Err(error) => error_response(error),
    }
}
