#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http_body_util::BodyExt;
use serde_json::{json, Value};

use billgate_core::billing::{BillingStatusLookup, BillingUserInfo, LookupError};
use billgate_core::identity::{AuthenticatedContext, IdentityError, IdentityResolver};
use billgate_server::gate::{AuthorizationGate, AuthorizationQuery};

/// Identity resolver that accepts any token, or fails every call.
pub struct StubIdentity {
    pub fail: bool,
}

#[async_trait]
impl IdentityResolver for StubIdentity {
    async fn resolve(&self, credential: &str) -> Result<AuthenticatedContext, IdentityError> {
        if self.fail {
            return Err(IdentityError::InvalidCredential("token expired".to_string()));
        }
        Ok(AuthenticatedContext {
            access_token: credential.to_string(),
            subject: Some("user_1".to_string()),
            role: Some("authenticated".to_string()),
        })
    }
}

pub enum StubAnswer {
    Snapshot(BillingUserInfo),
    NotFound,
    Rejected(&'static str),
    Transport(&'static str),
}

/// Lookup that returns a fixed answer and records what it was asked.
pub struct StubLookup {
    answer: StubAnswer,
    pub calls: AtomicUsize,
    pub last_request: Mutex<Option<(String, String)>>,
}

impl StubLookup {
    pub fn new(answer: StubAnswer) -> Arc<Self> {
        Arc::new(Self {
            answer,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BillingStatusLookup for StubLookup {
    async fn fetch_billing_status(
        &self,
        context: &AuthenticatedContext,
        account_id: &str,
    ) -> Result<BillingUserInfo, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap_or_else(|p| p.into_inner()) =
            Some((context.access_token.clone(), account_id.to_string()));
        match &self.answer {
            StubAnswer::Snapshot(info) => Ok(info.clone()),
            StubAnswer::NotFound => Err(LookupError::NotFound),
            StubAnswer::Rejected(message) => Err(LookupError::Rejected {
                message: message.to_string(),
                code: Some("P0001".to_string()),
            }),
            StubAnswer::Transport(message) => {
                Err(LookupError::Transport(anyhow::anyhow!(*message)))
            }
        }
    }
}

pub fn snapshot(role: Option<&str>, billing_enabled: bool) -> BillingUserInfo {
    BillingUserInfo {
        account_role: role.map(str::to_string),
        is_primary_owner: role == Some("owner"),
        is_personal_account: false,
        account_id: "acct_1".to_string(),
        billing_subscription_id: Some("sub_1".to_string()),
        billing_status: Some("active".to_string()),
        billing_customer_id: Some("cus_1".to_string()),
        billing_email: Some("billing@example.com".to_string()),
        billing_enabled,
        billing_provider: Some("stripe".to_string()),
    }
}

pub fn gate(lookup: Arc<StubLookup>) -> AuthorizationGate {
    AuthorizationGate::new(Arc::new(StubIdentity { fail: false }), lookup)
}

pub fn failing_identity_gate(lookup: Arc<StubLookup>) -> AuthorizationGate {
    AuthorizationGate::new(Arc::new(StubIdentity { fail: true }), lookup)
}

/// Per-branch invocation counters for a query built by [`counted_query`].
#[derive(Default, Clone)]
pub struct HandlerCalls {
    pub unauthorized: Arc<AtomicUsize>,
    pub billing_disabled: Arc<AtomicUsize>,
    pub authorized: Arc<AtomicUsize>,
    pub error: Arc<AtomicUsize>,
}

impl HandlerCalls {
    pub fn total(&self) -> usize {
        [
            &self.unauthorized,
            &self.billing_disabled,
            &self.authorized,
            &self.error,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }
}

/// A query with all four handlers wired, each counting its calls and
/// answering with a distinct status.
pub fn counted_query(account_id: &str, roles: &[&str], calls: &HandlerCalls) -> AuthorizationQuery {
    let unauthorized = Arc::clone(&calls.unauthorized);
    let billing_disabled = Arc::clone(&calls.billing_disabled);
    let authorized = Arc::clone(&calls.authorized);
    let error = Arc::clone(&calls.error);

    AuthorizationQuery::new(account_id, roles.iter().copied())
        .on_unauthorized(move |reason| {
            unauthorized.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok((
                    StatusCode::FORBIDDEN,
                    Json(json!({ "reason": reason.to_string() })),
                )
                    .into_response())
            }
        })
        .on_billing_disabled(move || {
            billing_disabled.fetch_add(1, Ordering::SeqCst);
            async { Ok(StatusCode::PAYMENT_REQUIRED.into_response()) }
        })
        .on_billable_and_authorized(move |info| {
            authorized.fetch_add(1, Ordering::SeqCst);
            async move { Ok((StatusCode::CREATED, Json(info)).into_response()) }
        })
        .on_error(move |err| {
            error.fetch_add(1, Ordering::SeqCst);
            async move {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "failure": err.to_string() })),
                )
                    .into_response()
            }
        })
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}
