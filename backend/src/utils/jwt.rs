//! JWT token utilities for session authentication.
//!
//! Provides token signing, parsing and claims construction. Parsing is pure:
//! it checks algorithm, signature, issuer and expiry and never consults the
//! session store.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::UserId;
use crate::errors::{ServiceError, ServiceResult};

/// Value of the `iss` claim on every token this service mints.
pub const TOKEN_ISSUER: &str = "tokengate";

/// JWT claims carried by a session token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// User the session belongs to
    pub sub: UserId,
    /// Token issued at timestamp
    pub iat: i64,
    /// Token expiration timestamp
    pub exp: i64,
    /// Issuer, always [`TOKEN_ISSUER`]
    pub iss: String,
    /// Unique per issuance
    pub jti: String,
}

impl TokenClaims {
    /// Fresh claims for `subject`, valid from now for `ttl`.
    ///
    /// Fails with `SigningFailure` when `now + ttl` cannot be represented.
    pub fn new(subject: UserId, ttl: std::time::Duration) -> ServiceResult<Self> {
        let now = Utc::now();
        let exp = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                ServiceError::signing_failure(format!(
                    "token lifetime of {}s is out of range",
                    ttl.as_secs()
                ))
            })?;

        Ok(TokenClaims {
            sub: subject,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: TOKEN_ISSUER.to_string(),
            jti: Uuid::now_v7().to_string(),
        })
    }

    pub fn subject(&self) -> UserId {
        self.sub
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Check if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Signs and parses session tokens with a shared HMAC secret.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec for `secret`. An empty secret is a misconfiguration.
    pub fn new(secret: &str) -> ServiceResult<Self> {
        if secret.is_empty() {
            return Err(ServiceError::signing_failure("signing secret is empty"));
        }

        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        // Only the HMAC family is accepted; anything else in the header is rejected.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Ok(TokenCodec {
            encoding_key,
            decoding_key,
            validation,
        })
    }

    /// Sign `claims` with HS256.
    pub fn sign(&self, claims: &TokenClaims) -> ServiceResult<String> {
        let token = encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| ServiceError::signing_failure(format!("Token generation failed: {}", e)))?;

        if token.is_empty() {
            return Err(ServiceError::signing_failure("encoder produced an empty token"));
        }
        Ok(token)
    }

    /// Validate and decode a token.
    pub fn parse(&self, token: &str) -> ServiceResult<TokenClaims> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "token failed validation");
                ServiceError::invalid_token()
            })
    }
}
