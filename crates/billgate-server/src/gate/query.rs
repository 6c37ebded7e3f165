use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};

use billgate_core::billing::BillingUserInfo;

use crate::error::{GateError, GateRejection};

use super::decision::{Decision, UnauthorizedReason};

/// Boxed future returned by outcome handlers. An `Err` is routed to the
/// error outcome.
pub type HandlerFuture = Pin<Box<dyn Future<Output = anyhow::Result<Response>> + Send + 'static>>;

type Handler<A> = Arc<dyn Fn(A) -> HandlerFuture + Send + Sync>;
type ErrorFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;
type ErrorHandler = Arc<dyn Fn(GateError) -> ErrorFuture + Send + Sync>;

/// Per-call-site configuration for [`AuthorizationGate::evaluate`].
///
/// Every handler is optional. When one is missing the gate answers that
/// branch with its built-in response.
///
/// [`AuthorizationGate::evaluate`]: super::AuthorizationGate::evaluate
#[derive(Clone)]
pub struct AuthorizationQuery {
    account_id: Option<String>,
    authorized_roles: HashSet<String>,
    on_billing_disabled: Option<Handler<()>>,
    on_unauthorized: Option<Handler<UnauthorizedReason>>,
    on_billable_and_authorized: Option<Handler<BillingUserInfo>>,
    on_error: Option<ErrorHandler>,
}

impl AuthorizationQuery {
    /// An empty `account_id` is treated as missing.
    pub fn new<I, S>(account_id: impl Into<String>, authorized_roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let account_id = account_id.into();
        Self {
            account_id: (!account_id.is_empty()).then_some(account_id),
            authorized_roles: authorized_roles.into_iter().map(Into::into).collect(),
            on_billing_disabled: None,
            on_unauthorized: None,
            on_billable_and_authorized: None,
            on_error: None,
        }
    }

    pub fn on_billing_disabled<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Response>> + Send + 'static,
    {
        self.on_billing_disabled = Some(Arc::new(move |()| -> HandlerFuture {
            Box::pin(handler())
        }));
        self
    }

    pub fn on_unauthorized<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(UnauthorizedReason) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Response>> + Send + 'static,
    {
        self.on_unauthorized = Some(Arc::new(move |reason| -> HandlerFuture {
            Box::pin(handler(reason))
        }));
        self
    }

    pub fn on_billable_and_authorized<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(BillingUserInfo) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Response>> + Send + 'static,
    {
        self.on_billable_and_authorized = Some(Arc::new(move |info| -> HandlerFuture {
            Box::pin(handler(info))
        }));
        self
    }

    /// The error handler cannot fail; whatever it returns is the final response.
    pub fn on_error<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(GateError) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.on_error = Some(Arc::new(move |err| -> ErrorFuture {
            Box::pin(handler(err))
        }));
        self
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    pub fn authorized_roles(&self) -> &HashSet<String> {
        &self.authorized_roles
    }

    /// Run the handler for `decision`, or the built-in response if none was supplied.
    pub(crate) async fn dispatch(&self, decision: Decision) -> Result<Response, GateError> {
        match decision {
            Decision::Unauthorized(reason) => {
                tracing::warn!(reason = %reason, "Billing gate rejected caller");
                match &self.on_unauthorized {
                    Some(handler) => handler(reason).await.map_err(GateError::Handler),
                    None => Ok(GateRejection::Unauthorized(reason).into_response()),
                }
            }
            Decision::BillingDisabled => {
                tracing::info!("Billing disabled for account");
                match &self.on_billing_disabled {
                    Some(handler) => handler(()).await.map_err(GateError::Handler),
                    None => Ok(GateRejection::BillingDisabled.into_response()),
                }
            }
            Decision::Authorized(info) => match &self.on_billable_and_authorized {
                Some(handler) => {
                    tracing::debug!(role = info.role_label(), "Billing gate authorized caller");
                    handler(*info).await.map_err(GateError::Handler)
                }
                None => {
                    tracing::error!("Billing gate passed but no success handler is configured");
                    Ok(GateRejection::MissingSuccessHandler.into_response())
                }
            },
        }
    }

    pub(crate) async fn fail(&self, err: GateError) -> Response {
        match &self.on_error {
            Some(handler) => handler(err).await,
            None => GateRejection::Internal(err).into_response(),
        }
    }
}

impl fmt::Debug for AuthorizationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationQuery")
            .field("account_id", &self.account_id)
            .field("authorized_roles", &self.authorized_roles)
            .field("on_billing_disabled", &self.on_billing_disabled.is_some())
            .field("on_unauthorized", &self.on_unauthorized.is_some())
            .field(
                "on_billable_and_authorized",
                &self.on_billable_and_authorized.is_some(),
            )
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
