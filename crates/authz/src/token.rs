use bookstore_db::UserRecord;
use bookstore_kernel::settings::AuthSettings;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::error::TokenError;

/// Claims carried by a bearer token. Never contains credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub name: String,
    /// Unique token id
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Issues and validates HS256 bearer tokens
#[derive(Clone)]
pub struct TokenService {
    issuer: String,
    audience: String,
    ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(settings: &AuthSettings) -> Self {
        let secret = settings.jwt_secret.as_bytes();
        let ttl_minutes = i64::try_from(settings.token_ttl_minutes).unwrap_or(i64::MAX / 60);
        Self {
            issuer: settings.jwt_issuer.clone(),
            audience: settings.jwt_audience.clone(),
            ttl: Duration::minutes(ttl_minutes),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user: &UserRecord) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: format!("{} {}", user.first_name, user.last_name),
            jti: Uuid::new_v4().to_string(),
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| TokenError::Signing)
    }

    /// Checks signature, expiry, issuer and audience
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(secret: &str) -> AuthSettings {
        AuthSettings {
            jwt_secret: secret.to_string(),
            ..AuthSettings::default()
        }
    }

    fn user() -> UserRecord {
        UserRecord {
            id: Uuid::now_v7(),
            email: "ada@example.com".to_string(),
            normalized_email: "ADA@EXAMPLE.COM".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password_hash: "$argon2id$v=19$secret-hash".to_string(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn issued_token_validates_and_names_the_user() {
        let service = TokenService::new(&settings("test-secret"));
        let user = user();

        let token = service.issue(&user).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.name, "Ada Lovelace");
        assert_eq!(claims.exp - claims.iat, service.ttl().whole_seconds());
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let token = TokenService::new(&settings("one")).issue(&user()).unwrap();
        let err = TokenService::new(&settings("two"))
            .validate(&token)
            .unwrap_err();
        assert_eq!(err, TokenError::InvalidSignature);
    }

    #[test]
    fn garbage_is_malformed() {
        let service = TokenService::new(&settings("test-secret"));
        assert_eq!(
            service.validate("not.a.token").unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = settings("test-secret");
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: Uuid::now_v7().to_string(),
            email: "ada@example.com".to_string(),
            name: "Ada Lovelace".to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: (now - Duration::hours(2)).unix_timestamp(),
            exp: (now - Duration::hours(1)).unix_timestamp(),
            iss: auth.jwt_issuer.clone(),
            aud: auth.jwt_audience.clone(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
        )
        .unwrap();

        let err = TokenService::new(&auth).validate(&token).unwrap_err();
        assert_eq!(err, TokenError::Expired);
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let token = TokenService::new(&settings("shared")).issue(&user()).unwrap();
        let other = TokenService::new(&AuthSettings {
            jwt_secret: "shared".to_string(),
            jwt_audience: "someone-else".to_string(),
            ..AuthSettings::default()
        });
        assert_eq!(other.validate(&token).unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn token_does_not_leak_the_password_hash() {
        let user = user();
        let token = TokenService::new(&settings("test-secret"))
            .issue(&user)
            .unwrap();
        assert!(!token.contains(&user.password_hash));
    }
}
