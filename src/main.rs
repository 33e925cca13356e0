//! Storefront API server.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `in_memory` (default) | `mongodb`
//! - `MONGODB_URI`: MongoDB connection string (required when `STORAGE_MODE=mongodb`)
//! - `MONGODB_DATABASE`: database name (default: `ecommerce`)
//! - `MEDIA_MODE`: `in_memory` (default) | `cloudinary`
//! - `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY`, `CLOUDINARY_API_SECRET`
//! - `ORDER_PRICING`: `client` (default) | `catalog`
//! - `AUTH_TOKENS`: `token=user_id:role` entries separated by `,`
//! - `RUST_LOG`: Logging level (e.g., `debug`, `storefront_api=debug`)
//! - `HOST`: Server host address (default: `0.0.0.0`)
//! - `PORT`: Server port (default: `5000`)
//! - `WORKER_THREADS`: Number of tokio worker threads (default: logical CPU count)

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_api::api::{AppState, StaticTokenAuthenticator, create_router};
use storefront_api::infrastructure::{AppConfig, RepositoryFactory};

fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Configuration error: {error}");
            std::process::exit(1);
        }
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(threads) = config.worker_threads {
        builder.worker_threads(threads);
        eprintln!("Tokio worker_threads set to: {threads}");
    } else {
        eprintln!("Tokio worker_threads: using default (logical CPU count)");
    }

    let runtime = match builder.build() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("Failed to create tokio runtime: {error}");
            std::process::exit(1);
        }
    };
    runtime.block_on(async_main(config));
}

async fn async_main(config: AppConfig) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting storefront API");
    tracing::info!(
        storage_mode = ?config.repository.storage_mode,
        media_mode = ?config.media.mode,
        pricing = config.pricing_policy.as_str(),
        "Configuration loaded"
    );

    let repositories = match RepositoryFactory::new(config.repository.clone()).create().await {
        Ok(repositories) => {
            tracing::info!("Repositories initialized successfully");
            repositories
        }
        Err(error) => {
            tracing::error!(%error, "Failed to initialize repositories");
            std::process::exit(1);
        }
    };

    let media_uploader = match config.media.create_uploader() {
        Ok(uploader) => {
            tracing::info!(provider = uploader.provider_name(), "Media uploader initialized");
            uploader
        }
        Err(error) => {
            tracing::error!(%error, "Failed to initialize media uploader");
            std::process::exit(1);
        }
    };

    let authenticator =
        match StaticTokenAuthenticator::parse(config.auth_tokens.as_deref().unwrap_or_default()) {
            Ok(authenticator) => authenticator,
            Err(error) => {
                tracing::error!(%error, "Invalid token table");
                std::process::exit(1);
            }
        };
    if authenticator.is_empty() {
        tracing::warn!("No tokens configured; every authenticated route will answer 401");
    } else {
        tracing::info!(tokens = authenticator.len(), "Token table loaded");
    }

    let state = AppState::new(repositories, media_uploader, Arc::new(authenticator))
        .with_pricing_policy(config.pricing_policy);
    let application = create_router(state);

    let address = config.bind_address();
    let listener = match TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, "Failed to bind to address {}", address);
            std::process::exit(1);
        }
    };

    match listener.local_addr() {
        Ok(address) => tracing::info!("Listening on {}", address),
        Err(error) => tracing::warn!(%error, "Could not determine local address"),
    }

    if let Err(error) = axum::serve(listener, application)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(%error, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

/// Completes on SIGINT, or on SIGTERM where available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
