use chrono::Utc;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by the backend's access token.
///
/// These are read WITHOUT verifying the signature. They are display hints for
/// the UI (who is signed in, has the token lapsed) and must never be used to
/// make authorization decisions; the server re-validates every request.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenClaims {
    /// The account email.
    pub sub: Option<String>,
    /// Expiry as a unix timestamp in seconds.
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Read the claims out of a JWT without checking its signature or expiry.
    pub fn decode_unverified(token: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
        Ok(data.claims)
    }

    /// True once `exp` is at or before `now`. Tokens without `exp` never expire.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp.is_some_and(|exp| exp <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }
}
