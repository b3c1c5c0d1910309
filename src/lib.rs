//! Documentation of a registration validation service.
//!
//!
//!
//! # General Infrastructure
//! - User loads the static form from `public/` and submits a registration
//!   number plus a verification number
//! - The backend looks the pair up in a single SQLite table and returns the
//!   stored details on a match
//! - Verification numbers are never computed at request time, they are
//!   derived once at seed time and only compared afterwards
//! - The store is read-only while the server runs, all writes happen in the
//!   startup seeder
//!
//!
//!
//! # Verification Numbers
//!
//! Each number is the first 8 hex characters of
//! HMAC-SHA256(`SECRET_SALT`, reg_no), uppercased. Knowing a registration
//! number is not enough to forge its verification number without the salt.
//!
//! If `SECRET_SALT` is missing the seeder falls back to a development-only
//! key and logs a warning. The fallback exists so local setups work out of
//! the box, a real deployment must always set the salt.
//!
//!
//!
//! # Request Lifecycle
//!
//! - Rate limiter caps each peer IP at roughly 100 requests per 15 minutes
//! - CORS is permissive, the form is served from the same origin anyway
//! - Both lookup fields are matched together in one query so a wrong code
//!   and an unknown registration number are indistinguishable to the caller
//!
//!
//!
//! # Setup
//!
//! Run the server.
//! ```sh
//! PORT=3000 SECRET_SALT=... cargo run
//! ```
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
//!
//! Environment:
//! - `PORT`: listen port, defaults to 3000
//! - `DATABASE_PATH`: SQLite file, defaults to `validation.db`
//! - `SECRET_SALT`: HMAC key for verification numbers
use std::{any::Any, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    handler::HandlerWithoutStateExt,
    http::{
        HeaderValue, Method, StatusCode,
        header::{CONTENT_TYPE, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS},
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod routes;
pub mod seed;
pub mod state;
pub mod verification;

use routes::{endpoint_not_found, health_handler, registrations_handler, validate_handler};
use state::State;

const PUBLIC_DIR: &str = "public";

// one permit every 9 seconds with a burst of 100 is ~100 requests / 15 min
const RATE_LIMIT_REPLENISH_SECS: u64 = 9;
const RATE_LIMIT_BURST: u32 = 100;

pub fn app(state: Arc<State>) -> Router {
    // unmatched non-GET requests also land on the JSON 404, not a 405
    let static_files = ServeDir::new(PUBLIC_DIR)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(endpoint_not_found.into_service());

    Router::new()
        .route("/api/validate", post(validate_handler))
        .route("/api/registrations", get(registrations_handler))
        .route("/api/health", get(health_handler))
        .fallback_service(static_files)
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new().await;

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(RATE_LIMIT_REPLENISH_SECS)
            .burst_size(RATE_LIMIT_BURST)
            .finish()
            .expect("Rate limiter misconfigured!"),
    );

    let app = app(state.clone())
        .layer(cors)
        .layer(GovernorLayer {
            config: governor_config,
        })
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(SetResponseHeaderLayer::if_not_present(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ));

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .unwrap();

    println!("Server shutting down...");
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    error!("Handler panicked: {detail}");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "message": "Something went wrong!",
        })),
    )
        .into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
