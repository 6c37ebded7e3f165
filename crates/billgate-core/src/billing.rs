use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::AuthenticatedContext;

/// Snapshot of a caller's relationship to an account and that account's
/// billing state, as returned by the account backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingUserInfo {
    /// `None` when the caller holds no membership row for the account.
    #[serde(default)]
    pub account_role: Option<String>,
    pub is_primary_owner: bool,
    pub is_personal_account: bool,
    pub account_id: String,
    #[serde(default)]
    pub billing_subscription_id: Option<String>,
    #[serde(default)]
    pub billing_status: Option<String>,
    #[serde(default)]
    pub billing_customer_id: Option<String>,
    #[serde(default)]
    pub billing_email: Option<String>,
    pub billing_enabled: bool,
    #[serde(default)]
    pub billing_provider: Option<String>,
}

impl BillingUserInfo {
    /// The role label used in rejection messages. An absent role reads as `null`.
    pub fn role_label(&self) -> &str {
        self.account_role.as_deref().unwrap_or("null")
    }
}

/// Why a billing status lookup produced no snapshot.
///
/// `NotFound` and `Rejected` are answers from the backend; `Transport` means
/// no usable answer arrived at all.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no billing status row for this caller and account")]
    NotFound,

    #[error("backend rejected billing status lookup: {message}")]
    Rejected {
        message: String,
        code: Option<String>,
    },

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// Fetches the role + billing snapshot for the caller in `context` on `account_id`.
#[async_trait]
pub trait BillingStatusLookup: Send + Sync + 'static {
    async fn fetch_billing_status(
        &self,
        context: &AuthenticatedContext,
        account_id: &str,
    ) -> Result<BillingUserInfo, LookupError>;
}
