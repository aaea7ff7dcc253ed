use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{config::JwtConfig, state::AppState};

/// Session token payload. The subject is the user's email.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
    pub iss: String,
    pub aud: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            ttl: Duration::from_secs((ttl_minutes as u64) * 60),
        }
    }
}

impl JwtKeys {
    fn sign_expiring_at(&self, subject: &str, exp: OffsetDateTime) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(subject = %subject, "jwt signed");
        Ok(token)
    }

    pub fn sign(&self, subject: &str) -> anyhow::Result<String> {
        let exp = OffsetDateTime::now_utc() + TimeDuration::seconds(self.ttl.as_secs() as i64);
        self.sign_expiring_at(subject, exp)
    }

    /// Checks signature, structure, issuer, audience and expiry. Expiry gets
    /// its own error so callers can report it distinctly.
    pub fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => VerifyError::Expired,
                _ => VerifyError::Invalid,
            }
        })?;
        debug!(subject = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        JwtKeys::from_ref(&AppState::fake())
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = make_keys();
        let token = keys.sign("alice@example.com").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
    }

    #[test]
    fn verify_reports_expiry_distinctly() {
        let keys = make_keys();
        // Two minutes in the past clears the default leeway.
        let exp = OffsetDateTime::now_utc() - TimeDuration::seconds(120);
        let token = keys.sign_expiring_at("alice@example.com", exp).expect("sign");
        assert_eq!(keys.verify(&token).unwrap_err(), VerifyError::Expired);
    }

    #[test]
    fn verify_rejects_tampered_token() {
        let keys = make_keys();
        let mut token = keys.sign("alice@example.com").expect("sign");
        token.push('x');
        assert_eq!(keys.verify(&token).unwrap_err(), VerifyError::Invalid);
    }

    #[test]
    fn verify_rejects_token_signed_with_other_secret() {
        let keys = make_keys();
        let other = JwtKeys {
            encoding: EncodingKey::from_secret(b"other-secret"),
            decoding: DecodingKey::from_secret(b"other-secret"),
            issuer: keys.issuer.clone(),
            audience: keys.audience.clone(),
            ttl: keys.ttl,
        };
        let token = other.sign("alice@example.com").expect("sign");
        assert_eq!(keys.verify(&token).unwrap_err(), VerifyError::Invalid);
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = make_keys();
        assert_eq!(keys.verify("not-a-jwt").unwrap_err(), VerifyError::Invalid);
    }
}
