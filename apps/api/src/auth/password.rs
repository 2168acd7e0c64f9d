use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sha2::{Digest, Sha256};
use tracing::error;

/// Normalized form used as the credential-map key and for id derivation.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Deterministic user id: `user_` + the normalized email with every
/// character outside `[a-z0-9]` replaced by `_`.
pub fn derive_user_id(email: &str) -> String {
    let slug: String = normalize_email(email)
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("user_{slug}")
}

/// Argon2id hash with a salt derived from the normalized email.
///
/// The remote store compares hashes by equality, so the same email and
/// password must always produce the same PHC string.
pub fn hash_password(email: &str, password: &str) -> anyhow::Result<String> {
    let digest = Sha256::digest(format!("resumate:{}", normalize_email(email)).as_bytes());
    let salt = SaltString::encode_b64(&digest[..16]).map_err(|e| {
        error!(error = %e, "argon2 salt encoding error");
        anyhow::anyhow!(e.to_string())
    })?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
