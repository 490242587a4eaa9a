//! # Dashboard — HTTP API for the Harvest Job Board
//!
//! Runs an Axum HTTP server exposing job postings, worker contracts, admin
//! statistics, and Kubernetes-style health and metrics endpoints. Handlers
//! reach persistence only through `Arc<dyn Store>`, so the same router serves
//! the in-memory store and PostgreSQL.

mod routes_contracts;
mod routes_health;
mod routes_jobs;
mod routes_stats;
mod routes_status;

use crate::config::{AppConfig, GeneratorConfig, ServerConfig};
use crate::formatter::{self, Clock, FormatError, SystemClock};
use crate::simulator::{self, ArrivalModel, SeededSource, SimulationError, SimulationParams};
use crate::store::{MemoryStore, Store};
use crate::{db, prom_metrics};
use anyhow::Result;
use axum::extract::Request;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Instrument};

/// Failure of [`AppState::regenerate_jobs`].
#[derive(Debug, thiserror::Error)]
pub enum RegenerateError {
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl RegenerateError {
    /// Whether the caller's parameters caused the failure.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, RegenerateError::Simulation(_) | RegenerateError::Format(_))
    }
}

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub clock: Arc<dyn Clock>,
    pub generator: GeneratorConfig,
    pub prom_metrics: prom_metrics::Metrics,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
        generator: GeneratorConfig,
    ) -> Arc<Self> {
        Arc::new(AppState {
            store,
            clock,
            generator,
            prom_metrics: prom_metrics::Metrics::new(),
        })
    }

    /// Replace every job with a freshly generated batch dated from the
    /// current clock. Returns the number of jobs stored.
    pub async fn regenerate_jobs(
        &self,
        params: &SimulationParams,
    ) -> std::result::Result<usize, RegenerateError> {
        let params = params.clone();
        let seed = self.generator.seed;
        let base = self.clock.now();
        let (samples, postings) =
            tokio::task::spawn_blocking(move || -> std::result::Result<_, RegenerateError> {
                let mut rng = SeededSource::new(seed);
                let samples = simulator::generate_with(&params, &mut rng)?;
                let postings = formatter::format_jobs(&samples, ArrivalModel::Poisson, base)?;
                Ok((samples, postings))
            })
            .await
            .map_err(|e| anyhow::anyhow!("job generation task failed: {}", e))??;
        let count = self.store.replace_jobs(postings).await?;
        self.prom_metrics.record_generated(&samples);
        self.refresh_job_gauge().await;
        Ok(count)
    }

    /// Seed the board from the generator config when the store holds no
    /// jobs. Returns the number of jobs inserted.
    pub async fn seed_if_empty(&self) -> Result<usize> {
        if self.store.count_jobs().await? > 0 {
            self.refresh_job_gauge().await;
            return Ok(0);
        }
        let count = self.regenerate_jobs(&self.generator.params(None, None)).await?;
        info!(count, seed = self.generator.seed, "seeded job board");
        Ok(count)
    }

    pub(super) async fn refresh_job_gauge(&self) {
        match self.store.count_jobs().await {
            Ok(n) => {
                self.prom_metrics.jobs_listed.set(n);
            }
            Err(e) => warn!(error = %e, "failed to count jobs"),
        }
    }
}

/// Middleware that records HTTP request duration into the Prometheus histogram,
/// generates (or propagates) a request ID for correlation, and wraps the
/// request in a tracing span using `.instrument()` for proper async propagation.
async fn metrics_middleware(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> axum::response::Response {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let method = req.method().to_string();
    let raw_path = req.uri().path().to_string();
    let norm_path = normalize_path(&raw_path);
    let start = std::time::Instant::now();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %raw_path,
    );
    let mut response = next.run(req).instrument(span).await;

    let duration = start.elapsed().as_secs_f64();
    state
        .prom_metrics
        .http_request_duration
        .get_or_create(&prom_metrics::HttpLabel {
            method,
            path: norm_path,
        })
        .observe(duration);

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

/// Normalize URL path to collapse high-cardinality segments (UUIDs, numeric IDs)
/// into placeholders, preventing histogram label explosion.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|seg| {
            if seg.is_empty() {
                seg.to_string()
            } else if seg.chars().all(|c| c.is_ascii_digit()) {
                ":id".to_string()
            } else if seg.len() == 36 && seg.chars().filter(|c| *c == '-').count() == 4 {
                ":uuid".to_string()
            } else {
                seg.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

pub fn build_router(
    state: Arc<AppState>,
    server: &ServerConfig,
    static_dir: Option<&Path>,
) -> Router {
    let mut app = Router::new()
        .route("/", get(routes_status::handler_index))
        .route("/health", get(routes_status::handler_health))
        .route(
            "/jobs",
            get(routes_jobs::handler_jobs_list).post(routes_jobs::handler_jobs_create),
        )
        .route(
            "/jobs/regenerate",
            post(routes_jobs::handler_jobs_regenerate),
        )
        .route(
            "/jobs/{id}",
            get(routes_jobs::handler_job_get).delete(routes_jobs::handler_job_delete),
        )
        .route(
            "/contracts",
            get(routes_contracts::handler_contracts_list)
                .post(routes_contracts::handler_contracts_create),
        )
        .route(
            "/contracts/{id}",
            get(routes_contracts::handler_contract_get)
                .patch(routes_contracts::handler_contract_update),
        )
        .route("/stats", get(routes_stats::handler_stats))
        .route("/healthz", get(routes_health::handler_healthz))
        .route("/readyz", get(routes_health::handler_readyz))
        .route("/metrics", get(routes_health::handler_metrics));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
    }

    app.layer(cors_layer(&server.cors_origins))
        .layer(CatchPanicLayer::new())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(server.body_limit_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.request_timeout_secs),
        ))
        .with_state(state)
}

/// Open the configured store: PostgreSQL when a URL is set, memory otherwise.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn Store>> {
    match config.database.url.as_deref() {
        Some(url) => {
            let database =
                db::Database::connect_with_max(url, config.database.max_connections).await?;
            info!(max_connections = config.database.max_connections, "using PostgreSQL store");
            Ok(Arc::new(database))
        }
        None => {
            info!("no database configured, using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

pub async fn run(config: AppConfig, static_dir: Option<&Path>) -> Result<()> {
    config.validate()?;
    let store = open_store(&config).await?;
    let state = AppState::new(store, Arc::new(SystemClock), config.generator.clone());
    state.seed_if_empty().await?;
    let app = build_router(state, &config.server, static_dir);

    let port = config.server.port;
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "dashboard running");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("dashboard shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! { _ = ctrl_c => info!("received SIGINT, shutting down"), _ = sigterm.recv() => info!("received SIGTERM, shutting down") }
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                ctrl_c.await.ok();
                info!("received SIGINT, shutting down");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("received SIGINT, shutting down");
    }
}
