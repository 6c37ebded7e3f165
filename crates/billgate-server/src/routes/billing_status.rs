use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::gate::AuthorizationQuery;
use crate::state::AppState;

/// `GET /api/accounts/{account_id}/billing-status`
///
/// Returns the caller's billing snapshot for the account when the caller holds
/// one of the configured roles and billing is enabled. Every other branch uses
/// the gate's built-in responses.
pub async fn billing_status(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let query = AuthorizationQuery::new(account_id, state.config.authorized_roles.iter().cloned())
        .on_billable_and_authorized(|info| async move {
            Ok((StatusCode::OK, Json(info)).into_response())
        });

    state.gate.evaluate(&headers, &query).await
}
