//! Application state for the HTTP microservice.
//!
//! Holds the configured [`Optimizer`] shared by every axum handler.

use std::sync::Arc;

use vroomapi_lib::{Optimizer, OptimizerConfig};

/// Shared application state for all axum handlers.
///
/// This struct is cheaply cloneable (using `Arc` internally) and should be
/// shared via axum's `State` extractor.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::get, extract::State};
/// use vroomapi_service_shared::{AppState, ServiceConfig};
///
/// async fn handler(State(state): State<AppState>) {
///     let optimizer = state.optimizer();
///     // ... run a query
/// }
///
/// let state = AppState::new(ServiceConfig::from_env().optimizer);
/// let app = Router::new()
///     .route("/route", get(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    optimizer: Optimizer,
    config: OptimizerConfig,
}

impl AppState {
    /// Build state from optimizer settings.
    ///
    /// An unusable binary is only logged here. It is reported again by the
    /// readiness probe and by each request in file mode.
    pub fn new(config: OptimizerConfig) -> Self {
        let optimizer = Optimizer::new(config.clone());
        if let Err(e) = optimizer.check_binary() {
            tracing::warn!(error = %e, "optimizer binary is not usable yet");
        }

        Self::from_optimizer(optimizer, config)
    }

    /// Create application state from a pre-built optimizer.
    ///
    /// This is useful for testing with a custom invocation strategy.
    pub fn from_optimizer(optimizer: Optimizer, config: OptimizerConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner { optimizer, config }),
        }
    }

    /// Access the shared optimizer.
    pub fn optimizer(&self) -> &Optimizer {
        &self.inner.optimizer
    }

    /// Settings the optimizer was built from.
    pub fn config(&self) -> &OptimizerConfig {
        &self.inner.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("binary", &self.inner.config.binary)
            .field("mode", &self.inner.config.mode)
            .field("timeout", &self.inner.config.timeout)
            .field("max_concurrent", &self.inner.config.max_concurrent)
            .finish()
    }
}
