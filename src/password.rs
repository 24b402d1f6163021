use anyhow::Context;
use argon2::{password_hash::{rand_core::OsRng, SaltString}, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};

use crate::telemetry::spawn_blocking_with_tracing;

const TEMPORARY_PASSWORD_LENGTH: usize = 12;
const TEMPORARY_PASSWORD_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";

// Function to compute password hash
pub fn compute_password_hash(password: SecretString) -> Result<SecretString, anyhow::Error>{
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
                            .hash_password(password.expose_secret().as_bytes(), &salt)
                            .map_err(|_| anyhow::anyhow!("Failed to compute password hash"))?
                            .to_string();

    Ok(SecretString::from(password_hash))
}

pub async fn hash_password(password: SecretString) -> Result<SecretString, anyhow::Error>{
    spawn_blocking_with_tracing(move || compute_password_hash(password))
        .await
        .context("Failed due to threadpool error")?
}

/// Checks a password against the stored credential.
///
/// Stored values in PHC format (`$argon2id$...`) are verified with argon2.
/// Anything else is a legacy plaintext credential and is compared directly.
/// PHC strings for other algorithms never match.
pub async fn verify_password(password: SecretString, stored: String) -> Result<bool, anyhow::Error>{
    if !stored.starts_with('$') {
        tracing::warn!("Verifying a legacy plaintext credential");
        return Ok(password.expose_secret() == stored);
    }

    let verified = spawn_blocking_with_tracing(move ||{
        match PasswordHash::new(stored.as_str()) {
            Ok(hash) => {
                Argon2::default()
                    .verify_password(password.expose_secret().as_bytes(), &hash)
                    .is_ok()
            },
            Err(e) => {
                tracing::warn!("Stored password hash could not be parsed: {}", e);
                false
            }
        }
    })
    .await
    .context("Failed due to threadpool error")?;

    Ok(verified)
}

pub fn generate_temporary_password() -> SecretString{
    let mut rng = rand::thread_rng();
    let password: String = (0..TEMPORARY_PASSWORD_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..TEMPORARY_PASSWORD_CHARSET.len());
            TEMPORARY_PASSWORD_CHARSET[idx] as char
        })
        .collect();

    SecretString::from(password)
}
