//! Argon2 verification for the configured admin password.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand_core::OsRng;
use zoom_core::auth::CredentialVerifier;

/// Checks a supplied password against an argon2 PHC string,
/// e.g. `$argon2id$v=19$…`. An unparsable stored hash never verifies.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Verifier;

impl CredentialVerifier for Argon2Verifier {
  fn verify(&self, supplied: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
      return false;
    };
    Argon2::default()
      .verify_password(supplied.as_bytes(), &parsed)
      .is_ok()
  }
}

/// Produce a PHC string for `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)?
      .to_string(),
  )
}
