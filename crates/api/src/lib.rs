//! # OfficeHours API
//!
//! The API crate provides the web server for the OfficeHours scheduling
//! service. Owners publish availability, consumers book it, and both sides
//! can list the appointments they take part in.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate HTTP requests into scheduler operations
//! - **Middleware**: Caller identity and error-to-status mapping
//! - **Config**: Handle environment and application configuration
//!
//! Handlers never touch the database directly. They go through
//! `officehours_core`'s ledger and scheduler, which are backed by
//! `officehours_db::PgStore` in production and by `MemoryStore` in tests.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Middleware for caller identity and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    BoxError, Json, Router,
    error_handling::HandleErrorLayer,
    http::{HeaderValue, Method, StatusCode, header},
};
use eyre::{Result, WrapErr};
use officehours_core::{
    ledger::AvailabilityLedger,
    scheduler::AppointmentScheduler,
    store::{AppointmentStore, IdentityDirectory, SlotStore},
};
use officehours_db::{DbPool, PgStore};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use crate::middleware::auth::USER_ID_HEADER;

/// Shared application state that is accessible to all request handlers
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use officehours_api::{ApiState, app};
/// use officehours_core::store::memory::MemoryStore;
///
/// let state = Arc::new(ApiState::new(Arc::new(MemoryStore::new())));
/// let router = app(state);
/// ```
#[derive(Clone)]
pub struct ApiState {
    /// Booking, cancellation and listing
    pub scheduler: AppointmentScheduler,
    /// Profiles, used to resolve callers and to register users
    pub directory: Arc<dyn IdentityDirectory>,
}

impl ApiState {
    /// Builds the state on top of a single store that implements every port.
    pub fn new<S>(store: Arc<S>) -> Self
    where
        S: SlotStore + AppointmentStore + IdentityDirectory + 'static,
    {
        let ledger = AvailabilityLedger::new(store.clone());
        let scheduler = AppointmentScheduler::new(ledger, store.clone(), store.clone());

        Self {
            scheduler,
            directory: store,
        }
    }

    pub fn from_parts(
        scheduler: AppointmentScheduler,
        directory: Arc<dyn IdentityDirectory>,
    ) -> Self {
        Self {
            scheduler,
            directory,
        }
    }

    pub fn ledger(&self) -> &AvailabilityLedger {
        self.scheduler.ledger()
    }
}

/// Builds the application router with every route and request tracing.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Profile registration and lookup
        .merge(routes::users::routes())
        // Availability and appointment endpoints
        .merge(routes::appointments::routes())
        .layer(TraceLayer::new_for_http())
        // Attach shared state to all routes
        .with_state(state)
}

/// Starts the API server with the provided configuration and database connection
///
/// This function initializes logging, wires the PostgreSQL store into the
/// scheduler, applies CORS and timeout layers, and serves HTTP until the
/// listener fails.
///
/// # Errors
///
/// Fails if a global subscriber is already installed, if a configured CORS
/// origin is not a valid header value, or if the address cannot be bound.
///
/// # Example
///
/// ```no_run
/// # async fn run() -> eyre::Result<()> {
/// use officehours_api::{config::ApiConfig, start_server};
///
/// let config = ApiConfig::from_env()?;
/// let pool = officehours_db::create_pool(&config.database_url, config.database_max_connections).await?;
/// start_server(config, pool).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: config::ApiConfig, db_pool: DbPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Create shared state with dependencies
    let state = Arc::new(ApiState::new(Arc::new(PgStore::new(db_pool))));

    let app = with_transport_layers(app(state), &config)?;

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Applies the configured CORS policy and request timeout to `router`.
///
/// A request running past `request_timeout` seconds is answered with
/// `408 Request Timeout`.
pub fn with_transport_layers(router: Router, config: &config::ApiConfig) -> Result<Router> {
    // Apply CORS configuration if origins are specified
    let router = match &config.cors_origins {
        Some(origins) => router.layer(cors_layer(origins)?),
        None => router,
    };

    // Add request timeout middleware
    Ok(router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_timeout))
            .timeout(Duration::from_secs(config.request_timeout)),
    ))
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .wrap_err_with(|| format!("Invalid CORS origin: {origin}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, USER_ID_HEADER])
        .allow_origin(origins)
        .allow_credentials(true))
}

async fn handle_timeout(err: BoxError) -> (StatusCode, Json<Value>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": "Request timed out", "kind": "timeout" })),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string(), "kind": "internal" })),
        )
    }
}
