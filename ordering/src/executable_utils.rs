use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use http::{HeaderValue, Method, header};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::{error::Error, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use common::config::{BackendConfig, Config};

use crate::{
    client::StockApiClient,
    handler::OrderHandler,
    model::{OrderForm, OrderResult},
};

pub const ORDER_ROUTE: &str = "/api/pedido";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "config/dev.yaml")]
    pub config: String,
}

pub fn initialize_executable() -> Result<Config, Box<dyn Error + Send + Sync>> {
    // Missing .env is fine; variables may come from the real environment.
    if let Ok(path) = dotenvy::dotenv() {
        println!("Loaded environment from {:?}", path);
    }

    let args = Args::parse();
    println!("Loading config from: {}", args.config);
    let config = Config::load(&args.config)?;
    println!("Loaded config: {:#?}", config);

    Ok(config)
}

pub fn initialize_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[derive(Clone)]
pub struct AppState {
    handler: OrderHandler,
}

impl AppState {
    pub fn new(handler: OrderHandler) -> Self {
        Self { handler }
    }
}

/// Routes without CORS or metrics; tests drive this directly.
pub fn create_router(handler: OrderHandler, metrics: Option<PrometheusHandle>) -> Router {
    let mut app = Router::new()
        .route(ORDER_ROUTE, post(submit_order_form))
        .route("/health", get(health_check));

    if let Some(handle) = metrics {
        app = app.route("/metrics", get(move || std::future::ready(handle.render())));
    }

    app.with_state(AppState::new(handler))
}

pub fn cors_layer(config: &BackendConfig) -> Result<CorsLayer, Box<dyn Error + Send + Sync>> {
    let layer = CorsLayer::new()
        .allow_methods([Method::POST, Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    match config.cors_origin.as_deref() {
        Some(origin) => Ok(layer.allow_origin(origin.parse::<HeaderValue>()?)),
        None => Ok(layer),
    }
}

pub async fn run_backend(config: Config) -> Result<(), Box<dyn Error + Send + Sync>> {
    let metrics = PrometheusBuilder::new().install_recorder()?;
    let client = StockApiClient::new(config.stock_api.url.clone());
    let handler = OrderHandler::new(Arc::new(client));

    let app = create_router(handler, Some(metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.backend)?);

    tracing::info!(
        project = %config.common.project_name,
        "Starting order backend at {}",
        config.backend.server_address
    );
    let listener = tokio::net::TcpListener::bind(&config.backend.server_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub async fn submit_order_form(State(state): State<AppState>, form: OrderForm) -> Response {
    tracing::debug!(fields = form.len(), "Received order form");
    let result = state.handler.submit_order(&form).await;
    let status = order_status(&result);
    (status, Json(result)).into_response()
}

/// Validation failures are the caller's fault; every other outcome is
/// reported inside the body.
fn order_status(result: &OrderResult) -> StatusCode {
    if result.validation_errors().is_some() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    }
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK").into_response()
}
