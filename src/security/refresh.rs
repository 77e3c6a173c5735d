use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use once_cell::sync::Lazy;
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;

static ARGON2: Lazy<Argon2<'static>> = Lazy::new(|| {
    let params = Params::new(64 * 1024, 3, 4, None).expect("argon2 params");
    Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params)
});

const SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("refresh token is not valid base64")]
    Encoding,
    #[error("hash error: {0}")]
    Hash(String),
}

/// Generates a fresh refresh secret: 256 bits from the OS RNG, returned
/// base64-encoded exactly once, along with the Argon2id hash that gets
/// persisted in its place. Each call salts independently.
pub fn generate() -> Result<(String, String), RefreshError> {
    let mut raw = [0u8; SECRET_LEN];
    OsRng.fill_bytes(&mut raw);
    let salt = SaltString::generate(&mut OsRng);
    let hash = ARGON2
        .hash_password(&raw, &salt)
        .map_err(|e| RefreshError::Hash(e.to_string()))?
        .to_string();
    Ok((BASE64.encode(raw), hash))
}

/// Verifies a presented secret against a stored hash. An unparseable stored
/// hash counts as a mismatch, the same answer a wrong secret gets.
pub fn verify(secret_b64: &str, hash: &str) -> Result<bool, RefreshError> {
    let raw = BASE64.decode(secret_b64).map_err(|_| RefreshError::Encoding)?;
    let Ok(parsed) = PasswordHash::new(hash) else {
        return Ok(false);
    };
    Ok(ARGON2.verify_password(&raw, &parsed).is_ok())
}
