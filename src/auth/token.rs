//! Session token issuing and verification.

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use super::{Claims, Role};

/// HMAC algorithms accepted at verification time. The token header picks one.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT generation error: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),

    #[error("Invalid JWT: {0}")]
    Decoding(#[source] jsonwebtoken::errors::Error),

    #[error("Token expired at {exp} (now {now})")]
    Expired { exp: i64, now: i64 },
}

/// A freshly signed session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
    /// Lifetime in seconds, for cookie Max-Age and `expires_in`
    pub expires_in: i64,
}

/// Signing and verification keys derived from the process-wide secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        // Expiry is checked by `verify` so that `exp == now` counts as expired.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            algorithm: Algorithm::HS256,
            ttl,
        }
    }

    /// Sign with a different HMAC algorithm (HS256 by default).
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for `subject` valid from `now` for the configured lifetime.
    pub fn issue(&self, subject: &str, role: Role, now: i64) -> Result<IssuedToken, TokenError> {
        let expires_in = self.ttl.num_seconds();
        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat: now,
            exp: now + expires_in,
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(TokenError::Encoding)?;

        Ok(IssuedToken {
            token,
            claims,
            expires_in,
        })
    }

    /// Check signature, payload shape and expiry as of `now` (Unix seconds).
    pub fn verify(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let data =
            decode::<Claims>(token, &self.decoding, &self.validation).map_err(TokenError::Decoding)?;

        if data.claims.exp <= now {
            return Err(TokenError::Expired {
                exp: data.claims.exp,
                now,
            });
        }

        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("algorithm", &self.algorithm)
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}
