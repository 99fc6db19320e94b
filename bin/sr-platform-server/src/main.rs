//! Showring Platform Server
//!
//! Production server for the platform REST APIs:
//! - Identity: register, login, refresh, logout, me
//! - Show management: shows, divisions, classes, entries, results
//! - Model horses and show-holder scoped shows
//! - Admin: roles and users
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SR_CONFIG` | `showring.toml` | Optional TOML config file |
//! | `SR_BIND_ADDR` | `0.0.0.0` | Listen address |
//! | `SR_API_PORT` | `8080` | HTTP API port |
//! | `SR_DATABASE_URL` | `sqlite://showring.db` | SQLite connection URL |
//! | `SR_JWT_SECRET` | - | HMAC signing secret (32+ chars) |
//! | `SR_JWT_ISSUER` | `showring` | JWT issuer claim |
//! | `SR_REQUIRE_CONFIRMED_ACCOUNT` | `false` | Block logins for unconfirmed accounts |
//! | `SR_ADMIN_EMAIL` / `SR_ADMIN_PASSWORD` | - | Bootstrap administrator |
//! | `SR_DEV_MODE` | `false` | Generate an ephemeral secret when none is set |
//! | `SR_LOG_JSON` | `false` | JSON log output |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;

use anyhow::Result;
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use sr_config::PlatformConfig;
use sr_platform::api::PlatformApiDoc;
use sr_platform::repository;
use sr_platform::service::AuthConfig;
use sr_platform::Platform;

fn init_tracing(json: bool) {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = PlatformConfig::load()?;
    init_tracing(config.logging.json);

    info!("Starting Showring Platform Server");
    info!(?config, "Configuration loaded");

    // Connect and apply schema
    info!("Opening database: {}", config.database.url);
    let pool = repository::open(&config.database.url, config.database.max_connections).await?;

    let auth_config = AuthConfig {
        secret: config.auth.jwt_secret.clone(),
        issuer: config.auth.issuer.clone(),
        access_token_expiry_secs: config.auth.access_token_expiry_secs,
        refresh_token_expiry_secs: config.auth.refresh_token_expiry_secs,
    };
    let platform = Arc::new(Platform::new(pool, auth_config, config.auth.require_confirmed_account));

    // Sync code-defined roles to database
    match platform.sync_roles().await {
        Ok(created) => info!(created, "Roles synced"),
        Err(e) => warn!("Role sync failed: {}", e),
    }

    if let (Some(email), Some(password)) = (&config.seed.admin_email, &config.seed.admin_password) {
        match platform.seed_admin(email, password).await {
            Ok(true) => info!(%email, "Administrator created"),
            Ok(false) => info!(%email, "Administrator already present"),
            Err(e) => warn!("Administrator seeding failed: {}", e),
        }
    }

    let probes = Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .with_state(platform.clone());

    let app = platform
        .router()
        .merge(probes)
        // OpenAPI / Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", PlatformApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);
    info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    platform.pool().close().await;
    info!("Showring Platform Server shutdown complete");
    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn ready_handler(State(platform): State<Arc<Platform>>) -> (StatusCode, Json<serde_json::Value>) {
    if platform.ping().await {
        (StatusCode::OK, Json(serde_json::json!({ "status": "READY" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "NOT_READY", "reason": "database unavailable" })),
        )
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received...");
}
