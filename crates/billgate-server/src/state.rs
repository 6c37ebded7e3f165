use std::sync::Arc;

use crate::config::Config;
use crate::gate::AuthorizationGate;
use crate::identity::BearerIdentityResolver;
use crate::lookup::RpcBillingStatusLookup;

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
pub struct AppState {
    pub config: Arc<Config>,
    pub gate: AuthorizationGate,
}

impl AppState {
    pub fn new(config: Config, gate: AuthorizationGate) -> Self {
        Self {
            config: Arc::new(config),
            gate,
        }
    }

    /// Wire the gate to the backend named in `config`.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let identity = Arc::new(BearerIdentityResolver::new(config.jwt_secret.as_deref()));
        let lookup = Arc::new(RpcBillingStatusLookup::from_config(&config)?);
        tracing::info!(endpoint = lookup.endpoint(), "Billing status lookup configured");
        Ok(Self::new(config, AuthorizationGate::new(identity, lookup)))
    }
}
