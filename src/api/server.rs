use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::config::BankConfig;
use crate::session::SessionController;

/// Build the CORS layer; `None` allows every origin (development mode)
pub fn cors_layer(allowed_origins: Option<&[String]>) -> anyhow::Result<CorsLayer> {
    let cors = match allowed_origins {
        Some(origins) => {
            log::info!("CORS configured for origins: {}", origins.join(","));
            let origin_list = origins
                .iter()
                .map(|origin| origin.parse::<HeaderValue>())
                .collect::<Result<Vec<_>, _>>()?;
            CorsLayer::new()
                .allow_origin(origin_list)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => {
            log::warn!("CORS: Allowing all origins (development mode). Set ALLOWED_ORIGINS env var for production.");
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };
    Ok(cors)
}

pub fn create_router(session: Arc<SessionController>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        // Session routes
        .route("/api/session", get(handlers::get_session_handler))
        .route("/api/session/connect", post(handlers::connect_handler))
        .route("/api/session/mount", post(handlers::mount_handler))
        .route("/api/session/refresh", post(handlers::refresh_handler))
        .route("/api/session/inputs", put(handlers::update_input_handler))
        .route(
            "/api/session/inputs/:field/submit",
            post(handlers::submit_input_handler),
        )
        // Bank contract routes
        .route(
            "/api/bank/name",
            get(handlers::get_bank_name_handler).post(handlers::set_bank_name_handler),
        )
        .route("/api/bank/owner", get(handlers::get_owner_handler))
        .route("/api/bank/balance", get(handlers::get_balance_handler))
        .route("/api/bank/deposit", post(handlers::deposit_handler))
        .route("/api/bank/withdraw", post(handlers::withdraw_handler))
        .with_state(session)
}

pub async fn start_server(config: BankConfig) -> anyhow::Result<()> {
    let session = Arc::new(SessionController::from_config(&config)?);

    let app = create_router(session)
        .layer(cors_layer(config.allowed_origins.as_deref())?)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    log::info!("Server listening on http://{}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            log::info!("Received SIGTERM signal");
        },
    }

    log::info!("Shutdown signal received, exiting gracefully...");
}
