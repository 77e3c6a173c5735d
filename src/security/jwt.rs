use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::domain::token::Fingerprint;

pub const TOKEN_KIND_ACCESS: &str = "access";

/// Claim set embedded in the access token. `rid` ties the token to the
/// refresh-token record it was issued alongside; `ip`/`ua` are the
/// fingerprint captured at issuance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub guid: i64,
    pub rid: Uuid,
    pub ip: String,
    pub ua: String,
    pub iat: i64,
    pub exp: i64,
    pub kind: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("token signature invalid")]
    SignatureInvalid,
    #[error("token expired")]
    Expired,
    #[error("token malformed")]
    Malformed,
    #[error("not an access token")]
    WrongTokenType,
}

/// Signs and verifies access tokens with a secret handed in at construction.
#[derive(Clone)]
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtManager {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::hours(24))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, guid: i64, rid: Uuid, fingerprint: &Fingerprint) -> Result<String, JwtError> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            guid,
            rid,
            ip: fingerprint.ip.clone(),
            ua: fingerprint.user_agent.clone(),
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
            kind: TOKEN_KIND_ACCESS.into(),
        };
        encode(&Header::new(Algorithm::HS512), &claims, &self.encoding)
            .map_err(|_| JwtError::Malformed)
    }

    /// Pins the algorithm to HS512: a token carrying any other `alg` header
    /// fails as `SignatureInvalid` rather than being verified under it.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::new(Algorithm::HS512);
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(map_decode_err)?;
        if data.claims.kind != TOKEN_KIND_ACCESS {
            return Err(JwtError::WrongTokenType);
        }
        Ok(data.claims)
    }
}

fn map_decode_err(err: jsonwebtoken::errors::Error) -> JwtError {
    use jsonwebtoken::errors::ErrorKind;
    match err.kind() {
        ErrorKind::ExpiredSignature => JwtError::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            JwtError::SignatureInvalid
        }
        _ => JwtError::Malformed,
    }
}
