//! Bearer token verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};

/// Verifies a raw bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenValidationError>;
}

/// HMAC-SHA256 token validator.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time window lives in `issued_at`/`expires_at`, checked by `validate_claims`.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl core::fmt::Debug for Hs256JwtValidator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256JwtValidator").finish_non_exhaustive()
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenValidationError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.key, &self.validation)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};
    use saledash_core::UserId;

    fn mint(secret: &str, expires_in: Duration) -> String {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: UserId::new(5),
            login: "demo".to_string(),
            name: "Demo".to_string(),
            roles: vec![],
            issued_at: now - Duration::seconds(1),
            expires_at: now + expires_in,
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn accepts_token_signed_with_same_secret() {
        let v = Hs256JwtValidator::new("s3cret");
        let claims = v.validate(&mint("s3cret", Duration::minutes(5)), Utc::now()).unwrap();
        assert_eq!(claims.sub, UserId::new(5));
    }

    #[test]
    fn rejects_wrong_secret() {
        let v = Hs256JwtValidator::new("s3cret");
        let err = v.validate(&mint("other", Duration::minutes(5)), Utc::now()).unwrap_err();
        assert!(matches!(err, TokenValidationError::Malformed(_)));
    }

    #[test]
    fn rejects_expired_token() {
        let v = Hs256JwtValidator::new("s3cret");
        let token = mint("s3cret", Duration::seconds(1));
        let later = Utc::now() + Duration::minutes(1);
        assert_eq!(v.validate(&token, later).unwrap_err(), TokenValidationError::Expired);
    }
}
