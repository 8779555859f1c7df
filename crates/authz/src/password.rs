use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use bookstore_kernel::settings::PasswordSettings;

use crate::error::IdentityError;

/// Signup password rules. Every violated rule is reported, not just the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        PasswordSettings::default().into()
    }
}

impl From<PasswordSettings> for PasswordPolicy {
    fn from(settings: PasswordSettings) -> Self {
        Self {
            min_length: settings.min_length,
            require_digit: settings.require_digit,
            require_lowercase: settings.require_lowercase,
            require_uppercase: settings.require_uppercase,
            require_non_alphanumeric: settings.require_non_alphanumeric,
        }
    }
}

impl PasswordPolicy {
    pub fn violations(&self, password: &str) -> Vec<String> {
        let mut problems = Vec::new();

        if password.chars().count() < self.min_length {
            problems.push(format!(
                "password must be at least {} characters",
                self.min_length
            ));
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            problems.push("password must contain a digit".to_string());
        }
        if self.require_lowercase && !password.chars().any(char::is_lowercase) {
            problems.push("password must contain a lowercase letter".to_string());
        }
        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            problems.push("password must contain an uppercase letter".to_string());
        }
        if self.require_non_alphanumeric && password.chars().all(char::is_alphanumeric) {
            problems.push("password must contain a non-alphanumeric character".to_string());
        }

        problems
    }

    pub fn check(&self, password: &str) -> Result<(), IdentityError> {
        let problems = self.violations(password);
        if problems.is_empty() {
            Ok(())
        } else {
            Err(IdentityError::WeakPassword(problems))
        }
    }
}

/// Well-formed Argon2id hash, with the same parameters as [`hash_password`],
/// that no password maps to. Sign-in verifies against it for unknown emails
/// so both rejection paths cost one Argon2 run.
pub const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Hash with Argon2id and a fresh salt
pub fn hash_password(password: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| IdentityError::HashingFailed)
}

/// A hash that fails to parse never verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
