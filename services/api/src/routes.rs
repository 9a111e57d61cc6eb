use crate::infra::{
    AppState, HostedCheckoutGateway, InMemoryAccountStore, InMemoryInteractionStore,
    InMemoryRoutineRepository, SharedSecretVerifier,
};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use glowplan::billing::{billing_router, BillingService};
use glowplan::engagement::{engagement_router, EngagementService};
use glowplan::routines::{routine_router, RoutineService};

pub(crate) type ApiRoutineService = RoutineService<InMemoryRoutineRepository, InMemoryAccountStore>;
pub(crate) type ApiEngagementService =
    EngagementService<InMemoryAccountStore, InMemoryInteractionStore>;
pub(crate) type ApiBillingService =
    BillingService<InMemoryAccountStore, HostedCheckoutGateway, SharedSecretVerifier>;

pub(crate) fn with_api_routes(
    routines: Arc<ApiRoutineService>,
    engagement: Arc<ApiEngagementService>,
    billing: Arc<ApiBillingService>,
) -> axum::Router {
    routine_router(routines)
        .merge(engagement_router(engagement))
        .merge(billing_router(billing))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
