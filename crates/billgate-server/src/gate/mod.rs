//! The authorization gate in front of billing-sensitive operations.
//!
//! A call runs a fixed sequence and stops at the first failing check:
//!
//! 1. credential and account id present
//! 2. caller resolved and billing status found for the account
//! 3. caller's role is one of the authorized roles
//! 4. billing enabled for the account
//!
//! Exactly one outcome handler (or its built-in default) produces the
//! response. Anything unexpected along the way, including a handler
//! returning `Err`, lands in the error outcome.

pub mod decision;
pub mod query;

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

use billgate_core::billing::BillingStatusLookup;
use billgate_core::identity::IdentityResolver;

use crate::error::GateError;

pub use decision::{check_inputs, decide, Decision, UnauthorizedReason};
pub use query::{AuthorizationQuery, HandlerFuture};

/// Holds the two collaborators. Stateless across calls; share it behind an `Arc`.
#[derive(Clone)]
pub struct AuthorizationGate {
    identity: Arc<dyn IdentityResolver>,
    lookup: Arc<dyn BillingStatusLookup>,
}

impl AuthorizationGate {
    pub fn new(identity: Arc<dyn IdentityResolver>, lookup: Arc<dyn BillingStatusLookup>) -> Self {
        Self { identity, lookup }
    }

    /// Evaluate a request's `Authorization` header against `query`.
    pub async fn evaluate(&self, headers: &HeaderMap, query: &AuthorizationQuery) -> Response {
        let credential = bearer_credential(headers);
        self.evaluate_credential(credential.as_deref(), query).await
    }

    /// Same as [`evaluate`](Self::evaluate) for callers that already hold the credential.
    pub async fn evaluate_credential(
        &self,
        credential: Option<&str>,
        query: &AuthorizationQuery,
    ) -> Response {
        let span = tracing::info_span!(
            "billing_gate",
            request_id = %Uuid::new_v4(),
            account_id = query.account_id().unwrap_or_default()
        );

        async move {
            match self.run(credential, query).await {
                Ok(response) => response,
                Err(err) => {
                    tracing::error!(error = %err, "Billing gate internal error");
                    query.fail(err).await
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        credential: Option<&str>,
        query: &AuthorizationQuery,
    ) -> Result<Response, GateError> {
        let (credential, account_id) = match check_inputs(credential, query.account_id()) {
            Ok(inputs) => inputs,
            Err(reason) => return query.dispatch(Decision::Unauthorized(reason)).await,
        };

        let context = self.identity.resolve(credential).await?;
        let lookup = self.lookup.fetch_billing_status(&context, account_id).await;
        let decision = decide(lookup, query.authorized_roles())?;
        query.dispatch(decision).await
    }
}

/// The `Authorization` header value with any `Bearer` scheme removed.
///
/// The scheme is matched case-insensitively. Missing, empty, or non-UTF-8
/// values count as absent.
pub fn bearer_credential(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match raw.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ if raw.eq_ignore_ascii_case("bearer") => "",
        _ => raw,
    };
    (!token.is_empty()).then(|| token.to_string())
}
