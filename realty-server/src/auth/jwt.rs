//! HS256 tokens carried in the `token` cookie

use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Authenticator, Identity};

/// Cookie the signed token is read from
pub const TOKEN_COOKIE: &str = "token";

/// Token lifetime used when none is given (7 days)
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub id: Uuid,
    #[serde(default)]
    pub is_admin: bool,
    pub exp: u64,
}

/// Token error type
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("token lifetime must be positive and within range")]
    InvalidLifetime,
}

/// Signing and verification keys derived from one shared secret
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 5;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign a token for `user` that expires after `ttl`.
    pub fn issue(&self, user: Uuid, ttl: Duration) -> Result<String, AuthError> {
        if ttl <= Duration::zero() {
            return Err(AuthError::InvalidLifetime);
        }

        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or(AuthError::InvalidLifetime)?;

        let claims = Claims {
            id: user,
            is_admin: false,
            exp: expires_at.timestamp() as u64,
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Check signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

/// Resolves identity from a signed token in a cookie
#[derive(Clone)]
pub struct JwtCookieAuth {
    keys: TokenKeys,
    cookie_name: String,
}

impl JwtCookieAuth {
    pub fn new(keys: TokenKeys) -> Self {
        Self::with_cookie(keys, TOKEN_COOKIE)
    }

    pub fn with_cookie(keys: TokenKeys, cookie_name: impl Into<String>) -> Self {
        Self {
            keys,
            cookie_name: cookie_name.into(),
        }
    }
}

impl Authenticator for JwtCookieAuth {
    fn resolve(&self, headers: &HeaderMap) -> Identity {
        let jar = CookieJar::from_headers(headers);
        let Some(cookie) = jar.get(&self.cookie_name) else {
            return Identity::Anonymous;
        };

        match self.keys.verify(cookie.value()) {
            Ok(claims) => Identity::User(claims.id),
            Err(e) => {
                tracing::debug!(error = %e, "rejected identity token");
                Identity::Anonymous
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    fn headers_with(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, cookie.parse().unwrap());
        headers
    }

    #[test]
    fn issued_token_verifies() {
        let keys = TokenKeys::from_secret(b"secret");
        let user = Uuid::new_v4();
        let token = keys.issue(user, Duration::days(1)).unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.id, user);
        assert!(!claims.is_admin);
    }

    #[test]
    fn wrong_secret_fails() {
        let token = TokenKeys::from_secret(b"one")
            .issue(Uuid::new_v4(), Duration::days(1))
            .unwrap();
        assert!(TokenKeys::from_secret(b"two").verify(&token).is_err());
    }

    #[test]
    fn non_positive_lifetime_rejected() {
        let keys = TokenKeys::from_secret(b"secret");
        assert!(matches!(
            keys.issue(Uuid::new_v4(), Duration::zero()),
            Err(AuthError::InvalidLifetime)
        ));
    }

    #[test]
    fn out_of_range_lifetime_rejected() {
        let keys = TokenKeys::from_secret(b"secret");
        let ttl = Duration::try_seconds(i64::MAX / 1_000).unwrap();
        assert!(matches!(
            keys.issue(Uuid::new_v4(), ttl),
            Err(AuthError::InvalidLifetime)
        ));
    }

    #[test]
    fn expired_token_fails() {
        let keys = TokenKeys::from_secret(b"secret");
        let claims = Claims {
            id: Uuid::new_v4(),
            is_admin: false,
            exp: (Utc::now() - Duration::hours(1)).timestamp() as u64,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret"))
            .unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn cookie_resolves_user() {
        let keys = TokenKeys::from_secret(b"secret");
        let user = Uuid::new_v4();
        let token = keys.issue(user, Duration::days(1)).unwrap();
        let auth = JwtCookieAuth::new(keys);

        let headers = headers_with(&format!("theme=dark; token={token}"));
        assert_eq!(auth.resolve(&headers), Identity::User(user));
    }

    #[test]
    fn missing_or_bad_cookie_is_anonymous() {
        let auth = JwtCookieAuth::new(TokenKeys::from_secret(b"secret"));
        assert_eq!(auth.resolve(&HeaderMap::new()), Identity::Anonymous);
        assert_eq!(
            auth.resolve(&headers_with("token=not-a-jwt")),
            Identity::Anonymous
        );
    }
}
