use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use super::error::UserError;

/// Work factor used when none is configured. Maps to the Argon2 time cost.
pub const DEFAULT_WORK_FACTOR: u32 = 10;

/// Hash `plain` with Argon2id. A fresh salt is generated per call and embedded in the
/// returned PHC string together with the parameters, so nothing else needs storing.
pub fn hash_password(plain: &str, work_factor: u32) -> Result<String, UserError> {
    let params = Params::new(
        Params::DEFAULT_M_COST,
        work_factor,
        Params::DEFAULT_P_COST,
        None,
    )
    .map_err(|e| {
        error!(error = %e, work_factor, "invalid argon2 params");
        UserError::Hashing(e.to_string())
    })?;

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            UserError::Hashing(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Check `plain` against a stored hash. Parameters are read from the hash itself.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool, UserError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        UserError::Hashing(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
