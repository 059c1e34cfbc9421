//! Hockey tracker binary entrypoint wiring configuration, storage, authentication and REST layers.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use hockey_tracker_back::{
    auth::{AuthProvider, DevAuthProvider, JwtAuthProvider},
    config::{AppConfig, AuthConfig, AuthMode, StoreBackend, StoreConfig},
    dao::store::{Store, memory::InMemoryStore},
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store = build_store(&config.store).await?;
    let (auth, tokens) = build_auth(&config.auth);

    let app = build_router(AppState::new(store, auth, tokens));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Open the configured persistence backend.
///
/// A database that cannot be reached aborts startup; the in-memory store is only used when
/// selected explicitly.
async fn build_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn Store>> {
    match config.backend {
        StoreBackend::Memory => {
            warn!("using in-memory store; data is lost when the process exits");
            Ok(Arc::new(InMemoryStore::new()))
        }
        #[cfg(feature = "mongo-store")]
        StoreBackend::Mongo => {
            use hockey_tracker_back::dao::store::mongodb::{MongoConfig, MongoStore};

            let mongo = MongoConfig::from_store_config(config)
                .await
                .context("parsing MongoDB configuration")?;
            let store = MongoStore::connect(mongo)
                .await
                .context("connecting to MongoDB")?;
            info!(database = %config.mongo_db, "connected to MongoDB");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongo-store"))]
        StoreBackend::Mongo => {
            anyhow::bail!("store backend `mongo` requires the `mongo-store` feature")
        }
    }
}

/// Select the request authenticator and the token issuer used at login.
fn build_auth(config: &AuthConfig) -> (Arc<dyn AuthProvider>, JwtAuthProvider) {
    let secret = config.jwt_secret.clone().unwrap_or_else(|| {
        warn!("no JWT secret configured; generated an ephemeral one, tokens will not survive a restart");
        format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
    });
    let tokens = JwtAuthProvider::new(&secret, config.token_ttl_hours);

    let auth: Arc<dyn AuthProvider> = match config.mode {
        AuthMode::Token => Arc::new(tokens.clone()),
        AuthMode::Dev => Arc::new(DevAuthProvider::new(config.dev_principal.clone())),
    };
    (auth, tokens)
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
