/// Authentication service - JWT access tokens
///
/// Credential issuance (passwords, login flows) happens elsewhere; this
/// service only mints tokens for the CLI and verifies bearer tokens.
use crate::error::{Result, ServerError};
use chorus_core::{principal::strip_bearer, ChorusError, Principal, TokenVerifier, UserId};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiration: Duration,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("access_token_expiration", &self.access_token_expiration)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub email: String,
    pub exp: i64, // Expiration time
    pub iat: i64, // Issued at
}

impl AuthService {
    pub fn new(secret: &str, access_expiration_hours: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expiration: Duration::hours(access_expiration_hours as i64),
        }
    }

    /// Create an access token for a principal
    pub fn create_access_token(&self, principal: &Principal) -> Result<String> {
        let now = Utc::now();
        let exp = now + self.access_token_expiration;

        let claims = Claims {
            sub: principal.id.as_str().to_string(),
            email: principal.email.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(ServerError::from)
    }

    /// Verify and decode a token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(token_data.claims)
    }
}

impl TokenVerifier for AuthService {
    fn resolve_token(&self, credential: &str) -> chorus_core::Result<Principal> {
        let claims = self.verify_token(strip_bearer(credential)).map_err(|e| {
            tracing::debug!("Token verification failed: {}", e);
            ChorusError::unauthenticated("Invalid or expired token")
        })?;

        let id = UserId::new(claims.sub);
        if !id.is_well_formed() {
            return Err(ChorusError::unauthenticated("Token subject is not a user id"));
        }

        Ok(Principal::new(id, claims.email))
    }
}
