use super::jwks::JwksClient;
use super::model::AuthenticatedUser;
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    issuer: String,
    audience: String,
    leeway: u64,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            sub: claims.sub,
            name: claims.name,
            email: claims.email,
            roles: claims.roles,
        }
    }
}

impl JwtValidator {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: String,
        leeway: Duration,
    ) -> Self {
        Self {
            jwks_client,
            issuer,
            audience,
            leeway: leeway.as_secs(),
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;

        let decoding_key = self
            .jwks_client
            .get_key(&kid)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        Ok(token_data.claims.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_without_roles_map_to_plain_user() {
        let claims: Claims = serde_json::from_value(serde_json::json!({
            "sub": "advisor-7",
            "iss": "https://id.example.com",
            "aud": "portal",
            "exp": 0
        }))
        .unwrap();

        let user = AuthenticatedUser::from(claims);
        assert_eq!(user.sub, "advisor-7");
        assert!(user.roles.is_empty());
        assert!(!user.is_staff());
    }

    #[test]
    fn test_claims_roles_and_profile_are_carried() {
        let claims: Claims = serde_json::from_value(serde_json::json!({
            "sub": "ops-1",
            "name": "Ops",
            "email": "ops@example.com",
            "roles": ["staff"]
        }))
        .unwrap();

        let user = AuthenticatedUser::from(claims);
        assert_eq!(user.email.as_deref(), Some("ops@example.com"));
        assert!(user.is_staff());
        assert!(!user.is_admin());
    }
}
