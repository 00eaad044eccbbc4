/// Admin authentication: credential check and signed-token gate
use crate::{
    config::AuthConfig,
    context::AppContext,
    error::{ApiError, ApiResult},
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Verifies a username/password pair against some credential source
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Single-admin credential pair from configuration
///
/// Stand-in for a real credential backend; the site has exactly one admin
/// identity.
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: String, password: String) -> Self {
        Self { username, password }
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

/// Claims carried by an admin token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub scope: String,
    pub exp: usize,
}

/// Issues and validates the bearer tokens guarding protected endpoints
pub struct AuthGate {
    verifier: Box<dyn CredentialVerifier>,
    secret: String,
    token_ttl_secs: u64,
}

impl AuthGate {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            verifier: Box::new(StaticCredentials::new(
                config.admin_username.clone(),
                config.admin_password.clone(),
            )),
            secret: config.token_secret.clone(),
            token_ttl_secs: config.token_ttl_secs,
        }
    }

    /// Check credentials and issue a signed admin token
    pub fn login(&self, username: &str, password: &str) -> ApiResult<String> {
        if !self.verifier.verify(username, password) {
            return Err(ApiError::Authentication(
                "invalid username or password".to_string(),
            ));
        }

        let claims = AdminClaims {
            sub: username.to_string(),
            scope: "admin".to_string(),
            exp: (Utc::now() + Duration::seconds(self.token_ttl_secs as i64)).timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("failed to issue token: {}", e)))
    }

    /// Validate a bearer token issued by `login`
    pub fn verify_token(&self, token: &str) -> ApiResult<AdminClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 30;

        let data = decode::<AdminClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ApiError::Authorization(format!("invalid token: {}", e)))?;

        if data.claims.scope != "admin" {
            return Err(ApiError::Authorization(
                "token does not carry admin scope".to_string(),
            ));
        }

        Ok(data.claims)
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(|t| t.to_string()))
}

/// Admin guard for protected handlers
///
/// Missing header rejects with 401; a present but invalid token with 403.
pub struct AdminAuth(pub AdminClaims);

#[async_trait]
impl FromRequestParts<AppContext> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Authentication("missing authorization header".to_string()))?;

        let claims = state.auth.verify_token(&token)?;

        Ok(AdminAuth(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn test_gate() -> AuthGate {
        AuthGate::new(&AuthConfig {
            admin_username: "admin".to_string(),
            admin_password: "secret".to_string(),
            token_secret: "unit-test-signing-secret".to_string(),
            token_ttl_secs: 3600,
        })
    }

    #[test]
    fn test_login_round_trip() {
        let gate = test_gate();

        let token = gate.login("admin", "secret").unwrap();
        let claims = gate.verify_token(&token).unwrap();

        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.scope, "admin");
    }

    #[test]
    fn test_login_rejects_bad_credentials() {
        let gate = test_gate();

        assert!(matches!(
            gate.login("admin", "wrong"),
            Err(ApiError::Authentication(_))
        ));
        assert!(matches!(
            gate.login("intruder", "secret"),
            Err(ApiError::Authentication(_))
        ));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let gate = test_gate();

        let result = gate.verify_token("not.a.token");
        assert!(matches!(result, Err(ApiError::Authorization(_))));

        // Token signed with a different secret
        let other = AuthGate::new(&AuthConfig {
            admin_username: "admin".to_string(),
            admin_password: "secret".to_string(),
            token_secret: "a-different-signing-secret".to_string(),
            token_ttl_secs: 3600,
        });
        let foreign = other.login("admin", "secret").unwrap();
        assert!(matches!(
            gate.verify_token(&foreign),
            Err(ApiError::Authorization(_))
        ));
    }

    #[test]
    fn test_bearer_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc123"));
        assert_eq!(extract_bearer_token(&headers), Some("abc123".to_string()));

        let mut bare = HeaderMap::new();
        bare.insert("authorization", HeaderValue::from_static("abc123"));
        assert_eq!(extract_bearer_token(&bare), None);

        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }
}
