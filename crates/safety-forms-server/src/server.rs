// crates/safety-forms-server/src/server.rs
// ============================================================================
// Module: Safety Forms Server
// Description: Store construction, listener binding, and graceful shutdown.
// Purpose: Run the HTTP API for a validated configuration.
// Dependencies: axum, tokio, tracing, safety-forms-{core, config, store-sqlite}
// ============================================================================

//! ## Overview
//! [`FormsServer::from_config`] validates configuration and opens the
//! configured store. [`FormsServer::serve`] binds the configured address and
//! stops on Ctrl-C; [`FormsServer::serve_with_shutdown`] accepts any listener
//! and shutdown future.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use safety_forms_config::SafetyFormsConfig;
use safety_forms_config::StoreConfig;
use safety_forms_config::StoreType;
use safety_forms_core::FormService;
use safety_forms_core::InMemoryFormStore;
use safety_forms_core::SharedFormStore;
use safety_forms_store_sqlite::SqliteFormStore;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::api::ServerState;
use crate::api::router;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Forms server errors.
#[derive(Debug, Error)]
pub enum FormsServerError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization error.
    #[error("init error: {0}")]
    Init(String),
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Forms Server
// ============================================================================

/// Forms server instance.
pub struct FormsServer {
    /// Server configuration.
    config: SafetyFormsConfig,
    /// Form operations over the configured store.
    service: FormService<SharedFormStore>,
}

impl FormsServer {
    /// Builds a server from configuration, opening the configured store.
    ///
    /// # Errors
    ///
    /// Returns [`FormsServerError`] when validation fails or the store
    /// cannot be opened.
    pub fn from_config(mut config: SafetyFormsConfig) -> Result<Self, FormsServerError> {
        config.validate().map_err(|err| FormsServerError::Config(err.to_string()))?;
        let store = build_form_store(&config.store)?;
        Self::with_store(config, store)
    }

    /// Builds a server over an already constructed store.
    ///
    /// # Errors
    ///
    /// Returns [`FormsServerError::Config`] when validation fails.
    pub fn with_store(
        mut config: SafetyFormsConfig,
        store: SharedFormStore,
    ) -> Result<Self, FormsServerError> {
        config.validate().map_err(|err| FormsServerError::Config(err.to_string()))?;
        Ok(Self {
            config,
            service: FormService::new(store),
        })
    }

    /// Returns the form service.
    #[must_use]
    pub const fn service(&self) -> &FormService<SharedFormStore> {
        &self.service
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &SafetyFormsConfig {
        &self.config
    }

    /// Builds the axum router for this server.
    ///
    /// # Errors
    ///
    /// Returns [`FormsServerError::Config`] when the CORS origin is not a
    /// valid header value.
    pub fn router(&self) -> Result<Router, FormsServerError> {
        let cors = &self.config.server.cors;
        let cors_origin = if cors.enabled {
            let origin = HeaderValue::from_str(&cors.allow_origin).map_err(|_| {
                FormsServerError::Config("invalid server.cors.allow_origin".to_string())
            })?;
            Some(origin)
        } else {
            None
        };
        Ok(router(Arc::new(ServerState {
            service: self.service.clone(),
            max_body_bytes: self.config.server.max_body_bytes,
            cors_origin,
        })))
    }

    /// Binds the configured address and serves until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns [`FormsServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), FormsServerError> {
        let addr = self
            .config
            .server
            .bind_addr()
            .map_err(|err| FormsServerError::Config(err.to_string()))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|err| FormsServerError::Transport(format!("http bind failed: {err}")))?;
        self.serve_with_shutdown(listener, shutdown_signal()).await
    }

    /// Serves on `listener` until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`FormsServerError`] when the router cannot be built or the
    /// server fails.
    pub async fn serve_with_shutdown<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), FormsServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router()?;
        let local = listener
            .local_addr()
            .map_err(|err| FormsServerError::Transport(err.to_string()))?;
        tracing::info!(addr = %local, "safety forms server listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|err| FormsServerError::Transport(format!("http server failed: {err}")))?;
        tracing::info!("safety forms server stopped");
        Ok(())
    }
}

/// Builds the form store from configuration.
///
/// # Errors
///
/// Returns [`FormsServerError`] when the sqlite store cannot be opened.
pub fn build_form_store(config: &StoreConfig) -> Result<SharedFormStore, FormsServerError> {
    let store = match config.store_type {
        StoreType::Memory => {
            tracing::warn!("using in-memory form store; data is lost on exit");
            SharedFormStore::from_store(InMemoryFormStore::new())
        }
        StoreType::Sqlite => {
            let sqlite_config = config.sqlite_config().ok_or_else(|| {
                FormsServerError::Config("sqlite store requires path".to_string())
            })?;
            let store = SqliteFormStore::new(sqlite_config)
                .map_err(|err| FormsServerError::Init(err.to_string()))?;
            SharedFormStore::from_store(store)
        }
    };
    Ok(store)
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install ctrl-c handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
