use crate::cli::ServeArgs;
use crate::infra::{
    AppState, HostedCheckoutGateway, InMemoryAccountStore, InMemoryInteractionStore,
    InMemoryRoutineRepository, SharedSecretVerifier,
};
use crate::routes::with_api_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

use glowplan::billing::BillingService;
use glowplan::catalog::ProductCatalog;
use glowplan::config::AppConfig;
use glowplan::engagement::EngagementService;
use glowplan::error::AppError;
use glowplan::routines::RoutineService;
use glowplan::rules::RuleTable;
use glowplan::telemetry;

fn load_reference_data(config: &AppConfig) -> Result<(ProductCatalog, RuleTable), AppError> {
    let mut catalog = ProductCatalog::standard();
    if let Some(path) = &config.data.purchase_links_csv {
        let links = glowplan::catalog::enrichment::from_path(path)?;
        info!(path = %path.display(), rows = links.len(), "applying purchase link overrides");
        catalog.apply_purchase_links(links);
    }

    let rules = match &config.data.rule_table_csv {
        Some(path) => {
            let table = glowplan::rules::parser::from_path(path)?;
            info!(path = %path.display(), rows = table.rows().len(), "loaded rule table");
            table
        }
        None => RuleTable::standard(),
    };

    for slot_id in rules.missing_slots(&catalog) {
        tracing::warn!(%slot_id, "rule table references a slot missing from the catalog");
    }

    Ok((catalog, rules))
}

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let (catalog, rules) = load_reference_data(&config)?;
    let catalog = Arc::new(catalog);
    let rules = Arc::new(rules);

    let routines = Arc::new(InMemoryRoutineRepository::default());
    let accounts = Arc::new(InMemoryAccountStore::default());
    let interactions = Arc::new(InMemoryInteractionStore::default());
    let gateway = Arc::new(HostedCheckoutGateway::default());
    let verifier = Arc::new(SharedSecretVerifier::new(
        config.billing.webhook_secret.clone(),
    ));

    let routine_service = Arc::new(RoutineService::new(
        routines,
        accounts.clone(),
        catalog,
        rules,
    ));
    let engagement_service = Arc::new(EngagementService::new(accounts.clone(), interactions));
    let billing_service = Arc::new(BillingService::new(accounts, gateway, verifier));

    let app = with_api_routes(routine_service, engagement_service, billing_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "glowplan routine service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
