use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use billgate_core::identity::IdentityError;

use crate::gate::decision::UnauthorizedReason;

pub const BILLING_DISABLED_MESSAGE: &str = "Billing is disabled for this account";
pub const MISSING_SUCCESS_HANDLER_MESSAGE: &str =
    "Config error: No onBillableAndAuthorized function passed in";

/// Anything unexpected that stops the gate from reaching a decision or
/// from completing a caller handler.
///
/// The `Display` output is the message surfaced as `Internal Error: <message>`.
#[derive(Debug, Error)]
pub enum GateError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Lookup(anyhow::Error),

    #[error(transparent)]
    Handler(anyhow::Error),
}

/// Built-in responses used when the caller did not supply a handler for a branch.
#[derive(Debug)]
pub enum GateRejection {
    Unauthorized(UnauthorizedReason),
    BillingDisabled,
    /// All checks passed but no success handler was wired at the call site.
    MissingSuccessHandler,
    Internal(GateError),
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self {
            GateRejection::Unauthorized(reason) => {
                error_response(&format!("Unauthorized: {reason}"), StatusCode::UNAUTHORIZED)
            }
            GateRejection::BillingDisabled => (
                StatusCode::OK,
                Json(json!({
                    "billing_enabled": false,
                    "message": BILLING_DISABLED_MESSAGE
                })),
            )
                .into_response(),
            GateRejection::MissingSuccessHandler => {
                error_response(MISSING_SUCCESS_HANDLER_MESSAGE, StatusCode::BAD_REQUEST)
            }
            GateRejection::Internal(err) => error_response(
                &format!("Internal Error: {err}"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        }
    }
}

/// JSON error envelope: `{ "error": "<message>" }`.
pub fn error_response(message: &str, status: StatusCode) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
