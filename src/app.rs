use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, patch},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::auth::TokenVerifier;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, MemoryTaskStore, PgTaskStore, TaskStore};
use crate::handlers::{fallback, public, tasks};
use crate::middleware::jwt_auth_middleware;

/// Per-process dependencies shared by every request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TaskStore>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(store: Arc<dyn TaskStore>, verifier: TokenVerifier) -> Self {
        Self {
            store,
            verifier: Arc::new(verifier),
        }
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(public::root).fallback(fallback::method_not_allowed))
        .route("/health", get(public::health).fallback(fallback::method_not_allowed))
        // Protected API
        .merge(task_routes(state.clone()))
        .fallback(fallback::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(&config.security.cors_origins))
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes)),
        )
        .with_state(state);

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn task_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/:user_id/tasks",
            get(tasks::tasks_get)
                .post(tasks::tasks_post)
                .fallback(fallback::method_not_allowed),
        )
        .route(
            "/api/:user_id/tasks/:id",
            get(tasks::task_get)
                .put(tasks::task_put)
                .delete(tasks::task_delete)
                .fallback(fallback::method_not_allowed),
        )
        .route(
            "/api/:user_id/tasks/:id/complete",
            patch(tasks::task_complete).fallback(fallback::method_not_allowed),
        )
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(allowed))
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("todo_api=info,tower_http=info"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Connect to PostgreSQL and make sure the tasks table exists
pub async fn connect_store(config: &AppConfig) -> anyhow::Result<Arc<dyn TaskStore>> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;

    let store = PgTaskStore::new(pool, config.tasks);
    store.ensure_schema().await.context("failed to prepare the tasks table")?;
    Ok(Arc::new(store))
}

pub fn memory_store(config: &AppConfig) -> Arc<dyn TaskStore> {
    warn!("Using the in-memory task store; tasks are lost on shutdown");
    Arc::new(MemoryTaskStore::new(config.tasks))
}

/// Bind, serve until Ctrl-C, then drain in-flight requests
pub async fn serve(config: AppConfig, store: Arc<dyn TaskStore>) -> anyhow::Result<()> {
    let verifier = TokenVerifier::new(&config.security.jwt_secret, config.security.jwt_leeway_secs)
        .context("JWT_SECRET must be set to verify bearer tokens")?;

    let router = app(AppState::new(store, verifier), &config);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Todo API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Todo API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
