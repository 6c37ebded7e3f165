use std::collections::HashSet;
use std::fmt;

use billgate_core::billing::{BillingUserInfo, LookupError};

use crate::error::GateError;

/// Why a caller was turned away. `Display` yields the reason text handed to
/// `on_unauthorized` and embedded in the default 401 body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnauthorizedReason {
    MissingToken,
    MissingAccountId,
    NotAMember,
    RoleNotAuthorized(Option<String>),
}

impl fmt::Display for UnauthorizedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnauthorizedReason::MissingToken => f.write_str("Missing authorization token"),
            UnauthorizedReason::MissingAccountId => f.write_str("Missing account ID"),
            UnauthorizedReason::NotAMember => f.write_str("User is not a member of this account"),
            UnauthorizedReason::RoleNotAuthorized(role) => write!(
                f,
                "User role '{}' is not authorized",
                role.as_deref().unwrap_or("null")
            ),
        }
    }
}

/// Terminal branch chosen by the decision sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Unauthorized(UnauthorizedReason),
    BillingDisabled,
    Authorized(Box<BillingUserInfo>),
}

/// Step 1: both a credential and an account id must be present.
///
/// A missing credential is reported even when the account id is missing too.
pub fn check_inputs<'a>(
    credential: Option<&'a str>,
    account_id: Option<&'a str>,
) -> Result<(&'a str, &'a str), UnauthorizedReason> {
    let credential = credential.filter(|c| !c.is_empty());
    let account_id = account_id.filter(|a| !a.is_empty());
    match (credential, account_id) {
        (None, _) => Err(UnauthorizedReason::MissingToken),
        (Some(_), None) => Err(UnauthorizedReason::MissingAccountId),
        (Some(credential), Some(account_id)) => Ok((credential, account_id)),
    }
}

/// Steps 2-4 over the lookup result: membership, role, billing enablement.
///
/// Backend answers without a row (`NotFound`, `Rejected`) are membership
/// failures. A `Transport` failure (network error, timeout, malformed body)
/// could also be read as a failed lookup and reported as "not a member", but
/// then a backend outage would look like a membership denial and never reach
/// `on_error`. It is treated as an internal failure instead and comes back
/// as `Err`, so it takes the 500 / `on_error` path.
pub fn decide(
    lookup: Result<BillingUserInfo, LookupError>,
    authorized_roles: &HashSet<String>,
) -> Result<Decision, GateError> {
    let info = match lookup {
        Ok(info) => info,
        Err(LookupError::NotFound | LookupError::Rejected { .. }) => {
            return Ok(Decision::Unauthorized(UnauthorizedReason::NotAMember));
        }
        Err(LookupError::Transport(e)) => return Err(GateError::Lookup(e)),
    };

    let role_ok = info
        .account_role
        .as_ref()
        .is_some_and(|role| authorized_roles.contains(role));
    if !role_ok {
        return Ok(Decision::Unauthorized(
            UnauthorizedReason::RoleNotAuthorized(info.account_role),
        ));
    }

    if !info.billing_enabled {
        return Ok(Decision::BillingDisabled);
    }

    Ok(Decision::Authorized(Box::new(info)))
}
