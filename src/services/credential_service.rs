use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Lifetime of a session token, counted from issuance.
pub const TOKEN_VALIDITY_DAYS: i64 = 10;

/// Claim names owned by the service; extra claims may not shadow them.
const RESERVED_CLAIMS: [&str; 3] = ["userId", "iat", "exp"];

/// Single failure kind for token verification. Callers must not care whether
/// the token was forged, truncated or simply too old.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Invalid or expired token")]
    InvalidCredential,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionClaims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Mints and verifies stateless HS256 session tokens.
///
/// Holds only immutable key material, so one instance is shared by every
/// worker through `web::Data`.
#[derive(Clone)]
pub struct CredentialService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity: Duration,
}

impl CredentialService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validity: Duration::days(TOKEN_VALIDITY_DAYS),
        }
    }

    pub fn mint(&self, user_id: i64, extra: Map<String, Value>) -> Result<String, jsonwebtoken::errors::Error> {
        self.mint_at(user_id, extra, Utc::now())
    }

    pub fn mint_at(
        &self,
        user_id: i64,
        mut extra: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        for reserved in RESERVED_CLAIMS {
            extra.remove(reserved);
        }

        let claims = SessionClaims {
            user_id,
            iat: now.timestamp(),
            exp: (now + self.validity).timestamp(),
            extra,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, CredentialError> {
        self.verify_at(token, Utc::now())
    }

    /// Valid iff the signature matches and `now < exp`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, CredentialError> {
        // Expiry is checked below against `now` with no leeway
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("Token rejected: {}", e);
                CredentialError::InvalidCredential
            })?;

        if now.timestamp() >= claims.exp {
            log::debug!("Token rejected: expired at {}", claims.exp);
            return Err(CredentialError::InvalidCredential);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &str = "test-secret-for-unit-tests";

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let service = CredentialService::new(SECRET);
        let token = service.mint(42, Map::new()).unwrap();

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.exp - claims.iat, TOKEN_VALIDITY_DAYS * 24 * 60 * 60);
    }

    #[test]
    fn test_expiry_boundary() {
        let service = CredentialService::new(SECRET);
        let t = issued_at();
        let token = service.mint_at(7, Map::new(), t).unwrap();

        let just_before = t + Duration::days(TOKEN_VALIDITY_DAYS) - Duration::seconds(1);
        assert_eq!(service.verify_at(&token, just_before).unwrap().user_id, 7);

        let at_expiry = t + Duration::days(TOKEN_VALIDITY_DAYS);
        assert_eq!(
            service.verify_at(&token, at_expiry),
            Err(CredentialError::InvalidCredential)
        );

        let long_after = t + Duration::days(365);
        assert_eq!(
            service.verify_at(&token, long_after),
            Err(CredentialError::InvalidCredential)
        );
    }

    #[test]
    fn test_any_flipped_byte_is_rejected() {
        let service = CredentialService::new(SECRET);
        let t = issued_at();
        let token = service.mint_at(3, Map::new(), t).unwrap();
        let check_time = t + Duration::hours(1);

        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] ^= 0x01;
            let tampered = String::from_utf8(bytes).unwrap();

            assert_eq!(
                service.verify_at(&tampered, check_time),
                Err(CredentialError::InvalidCredential),
                "byte {} flipped but token still verified",
                i
            );
        }
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let minting = CredentialService::new(SECRET);
        let other = CredentialService::new("a-completely-different-secret");
        let token = minting.mint(1, Map::new()).unwrap();

        assert_eq!(other.verify(&token), Err(CredentialError::InvalidCredential));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let service = CredentialService::new(SECRET);
        for garbage in ["", "not-a-token", "a.b.c", "Bearer x.y.z"] {
            assert_eq!(service.verify(garbage), Err(CredentialError::InvalidCredential));
        }
    }

    #[test]
    fn test_extra_claims_survive_but_cannot_shadow() {
        let service = CredentialService::new(SECRET);

        let mut extra = Map::new();
        extra.insert("username".into(), Value::from("alice"));
        extra.insert("userId".into(), Value::from(999));
        extra.insert("exp".into(), Value::from(i64::MAX));

        let t = issued_at();
        let token = service.mint_at(5, extra, t).unwrap();
        let claims = service.verify_at(&token, t).unwrap();

        assert_eq!(claims.user_id, 5);
        assert_eq!(claims.exp, (t + Duration::days(TOKEN_VALIDITY_DAYS)).timestamp());
        assert_eq!(claims.extra.get("username"), Some(&Value::from("alice")));
        assert!(!claims.extra.contains_key("userId"));
    }
}
