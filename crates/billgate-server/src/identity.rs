use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use billgate_core::identity::{AuthenticatedContext, IdentityError, IdentityResolver};

#[derive(Debug, Deserialize)]
struct AccessClaims {
    sub: Option<String>,
    role: Option<String>,
}

/// Resolves bearer access tokens issued by the account backend.
///
/// Without a secret the claims are read unverified and the backend stays the
/// authority on the token; an undecodable token still resolves, with no
/// subject. With a secret the token must verify under HS256.
pub struct BearerIdentityResolver {
    key: DecodingKey,
    validation: Validation,
    verify: bool,
}

impl BearerIdentityResolver {
    pub fn new(jwt_secret: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Backend tokens carry `aud: authenticated`; audience is the backend's concern.
        validation.validate_aud = false;

        match jwt_secret {
            Some(secret) => Self {
                key: DecodingKey::from_secret(secret.as_bytes()),
                validation,
                verify: true,
            },
            None => {
                validation.insecure_disable_signature_validation();
                validation.validate_exp = false;
                validation.required_spec_claims.clear();
                Self {
                    key: DecodingKey::from_secret(&[]),
                    validation,
                    verify: false,
                }
            }
        }
    }
}

#[async_trait]
impl IdentityResolver for BearerIdentityResolver {
    async fn resolve(&self, credential: &str) -> Result<AuthenticatedContext, IdentityError> {
        let claims = match decode::<AccessClaims>(credential, &self.key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) if self.verify => {
                return Err(IdentityError::InvalidCredential(e.to_string()));
            }
            Err(e) => {
                tracing::debug!(error = %e, "Bearer token claims unreadable; deferring to backend");
                None
            }
        };

        let (subject, role) = claims.map(|c| (c.sub, c.role)).unwrap_or_default();
        Ok(AuthenticatedContext {
            access_token: credential.to_string(),
            subject,
            role,
        })
    }
}
