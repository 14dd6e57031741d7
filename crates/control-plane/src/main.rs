// Professor Planner API server
// Decision: The HTTP API and the reminder sweep run in one process
// Decision: No DATABASE_URL means in-memory dev mode

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::{extract::State, routing::get, Json, Router};
use planner_control_plane::api::{self, build_router_with_prefix};
use planner_control_plane::config::{NotificationConfig, ServerConfig};
use planner_control_plane::mailer::MailerBackend;
use planner_control_plane::openapi::ApiDoc;
use planner_control_plane::storage::StorageBackend;
use planner_core::{NotificationSweep, SchedulerConfig, SweepConfig, SweepScheduler};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    storage: &'static str,
    notifications_enabled: bool,
}

#[derive(Clone)]
struct HealthState {
    storage: &'static str,
    notifications_enabled: bool,
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage,
        notifications_enabled: state.notifications_enabled,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "planner_control_plane=debug,planner_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("planner-control-plane starting...");

    let server_config = ServerConfig::from_env();
    let notification_config =
        NotificationConfig::from_env().context("Invalid reminder configuration")?;

    // Initialize storage
    let db = match &server_config.database_url {
        Some(url) => {
            let db = StorageBackend::postgres(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");
            db
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage (data is lost on restart)");
            StorageBackend::in_memory()
        }
    };

    // Start the reminder sweep
    let sweep = start_reminder_sweep(&notification_config, db.clone())?;

    let health_state = HealthState {
        storage: db.mode(),
        notifications_enabled: notification_config.enabled,
    };
    let app = build_app(db, &server_config, health_state);

    // Start HTTP server
    let listener = tokio::net::TcpListener::bind(&server_config.bind_addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("HTTP server listening on {}", server_config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some((scheduler, handle)) = sweep {
        scheduler.shutdown();
        if let Err(e) = handle.await {
            tracing::warn!("Reminder scheduler task ended abnormally: {}", e);
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Build the mailer and start the hourly sweep, unless disabled
fn start_reminder_sweep(
    config: &NotificationConfig,
    db: StorageBackend,
) -> Result<Option<(SweepScheduler, JoinHandle<()>)>> {
    if !config.enabled {
        tracing::warn!("Reminder emails disabled (NOTIFICATIONS_ENABLED=false)");
        return Ok(None);
    }

    let mailer = MailerBackend::from_config(&config.mail).context("Invalid mail configuration")?;
    tracing::info!(
        transport = mailer.kind(),
        smtp_host = %config.mail.smtp_host,
        interval_secs = config.interval.as_secs(),
        send_timeout_secs = config.send_timeout.as_secs(),
        "Reminder emails configured"
    );

    let sweep = NotificationSweep::new(
        Arc::new(db),
        Arc::new(mailer),
        SweepConfig::default().with_send_timeout(config.send_timeout),
    );
    let scheduler = SweepScheduler::new(
        Arc::new(sweep),
        SchedulerConfig::default().with_interval(config.interval),
    );
    let handle = scheduler.start();

    Ok(Some((scheduler, handle)))
}

fn build_app(db: StorageBackend, config: &ServerConfig, health_state: HealthState) -> Router {
    if !config.api_prefix.is_empty() {
        tracing::info!(prefix = %config.api_prefix, "API prefix configured");
    }

    let mut app = Router::new().route("/health", get(health).with_state(health_state));

    app = app.merge(build_router_with_prefix(api::routes(db), &config.api_prefix));

    let app =
        app.merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    let cors_origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let app = if cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
        app
    } else {
        tracing::info!(origins = ?cors_origins, "CORS origins configured");
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    header::ORIGIN,
                    header::HeaderName::from_static(planner_control_plane::auth::USER_ID_HEADER),
                ])
                .allow_credentials(true),
        )
    };

    // Add tracing
    app.layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
