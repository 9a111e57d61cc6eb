use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::cards::DashboardPage;
use super::service::{EngagementError, EngagementService, InteractionRepository};
use super::state::CardAction;
use crate::accounts::{AccountStore, StoreError};
use crate::routines::router::require_user;

fn error_response(error: EngagementError) -> Response {
    match &error {
        EngagementError::UnknownCard(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        EngagementError::Store(StoreError::NotFound) => {
            let payload = json!({ "error": "not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        _ => {
            tracing::error!(error = %error, "engagement service failure");
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct CardsQuery {
    #[serde(default = "default_page")]
    page: DashboardPage,
}

fn default_page() -> DashboardPage {
    DashboardPage::Home
}

#[derive(Debug, Deserialize)]
struct InteractionRequest {
    id: String,
    action: CardAction,
}

async fn list_cards<S, I>(
    State(service): State<Arc<EngagementService<S, I>>>,
    headers: HeaderMap,
    Query(query): Query<CardsQuery>,
) -> Response
where
    S: AccountStore,
    I: InteractionRepository,
{
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match service.visible_cards(&user, query.page, Utc::now()) {
        Ok(cards) => Json(json!({ "cards": cards })).into_response(),
        Err(error) => error_response(error),
    }
}

async fn record_interaction<S, I>(
    State(service): State<Arc<EngagementService<S, I>>>,
    headers: HeaderMap,
    Json(request): Json<InteractionRequest>,
) -> Response
where
    S: AccountStore,
    I: InteractionRepository,
{
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match service.record_interaction(&user, &request.id, request.action, Utc::now()) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

async fn current_banner<S, I>(
    State(service): State<Arc<EngagementService<S, I>>>,
    headers: HeaderMap,
) -> Response
where
    S: AccountStore,
    I: InteractionRepository,
{
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match service.current_banner(&user, Utc::now()) {
        Ok(banner) => Json(json!({ "banner": banner })).into_response(),
        Err(error) => error_response(error),
    }
}

pub fn engagement_router<S, I>(service: Arc<EngagementService<S, I>>) -> Router
where
    S: AccountStore + 'static,
    I: InteractionRepository + 'static,
{
    Router::new()
        .route("/api/v1/cards", get(list_cards::<S, I>))
        .route("/api/v1/cards/interactions", post(record_interaction::<S, I>))
        .route("/api/v1/banner", get(current_banner::<S, I>))
        .with_state(service)
}
