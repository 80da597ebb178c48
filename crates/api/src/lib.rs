//! Plant Health API Server
//!
//! Single inference endpoint that classifies a plant's health from one
//! sensor reading, plus health and metrics endpoints.

use axum::{
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use dispatcher::Dispatcher;
use data_validator::Validator;
use inference_engine::panic_message;
use metrics_exporter_prometheus::PrometheusHandle;
use std::any::Any;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod error;
mod rate_limit;
mod routes;
mod settings;
mod telemetry;

pub use error::ApiError;
pub use rate_limit::{create_governor_config, RateLimitConfig};
pub use routes::predict::PredictResponse;
pub use settings::{LoggingConfig, MetricsConfig, ModelConfig, ServerConfig, Settings};
pub use telemetry::{RequestCounts, RequestStats};

/// Application state shared across handlers.
///
/// Read-only after startup apart from the atomic request counters.
pub struct AppState {
    /// Model-or-rules classification
    pub dispatcher: Dispatcher,
    /// Request body validation
    pub validator: Validator,
    /// Request counters
    pub stats: RequestStats,
    /// Prometheus handle when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state around a dispatcher
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            validator: Validator::new(),
            stats: RequestStats::default(),
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Attach a Prometheus handle for `/metrics`
    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/predict", post(routes::predict::predict))
        .route("/api/v1/health", get(routes::health::health))
        .route("/metrics", get(routes::health::metrics))
        .fallback(not_found)
        .with_state(state);

    with_middleware(router)
}

/// Wrap a router with tracing, panic containment, and CORS
pub fn with_middleware(router: Router) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(CorsLayer::permissive()),
    )
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> axum::response::Response {
    ApiError::Internal(panic_message(payload.as_ref())).into_response()
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let level = Level::from_str(&config.level)
        .map_err(|_| anyhow::anyhow!("invalid log level '{}'", config.level))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    Ok(())
}

/// Load the classifier and serve until the listener fails
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let metrics = if settings.metrics.enabled {
        info!("Prometheus metrics enabled at /metrics");
        Some(telemetry::install_recorder()?)
    } else {
        None
    };

    let classifier = inference_engine::load_classifier(&settings.model.path);
    let state = Arc::new(AppState::new(Dispatcher::new(classifier)).with_metrics(metrics));

    let mut app = create_router(state);
    if let Some(limit) = &settings.rate_limit {
        info!(
            "Rate limiting enabled: burst {} per peer, one request every {}s",
            limit.burst_size, limit.per_second
        );
        app = app.layer(GovernorLayer {
            config: create_governor_config(limit)?,
        });
    }

    let addr = settings.server.bind_addr();
    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
