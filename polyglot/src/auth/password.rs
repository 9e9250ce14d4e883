//! Argon2id password hashing with a server-side pepper.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};

use super::errors::{AuthError, AuthResult};

/// One-way salted password hasher.
///
/// Digests are PHC strings carrying their own salt and cost parameters, so
/// a digest produced with one cost setting still verifies after the
/// setting changes.
#[derive(Clone)]
pub struct PasswordHasher {
    pepper: String,
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create a hasher with the default Argon2id cost
    pub fn new(pepper: impl Into<String>) -> Self {
        Self {
            pepper: pepper.into(),
            argon2: Argon2::default(),
        }
    }

    /// Create a hasher with an explicit memory (KiB) and iteration cost
    ///
    /// # Errors
    ///
    /// * `AuthError::HashingFailed` - Parameters rejected by Argon2
    pub fn with_cost(
        pepper: impl Into<String>,
        memory_kib: u32,
        iterations: u32,
    ) -> AuthResult<Self> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|_| AuthError::HashingFailed)?;

        Ok(Self {
            pepper: pepper.into(),
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password with a fresh random salt
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        let peppered = self.pepper(password);
        let salt = SaltString::generate(&mut OsRng);

        Ok(self
            .argon2
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Check a plaintext password against a stored digest
    ///
    /// Returns false on mismatch and on digests that cannot be parsed.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            log::warn!("Stored password digest could not be parsed");
            return false;
        };

        self.argon2
            .verify_password(self.pepper(password).as_bytes(), &parsed)
            .is_ok()
    }

    fn pepper(&self, password: &str) -> String {
        format!("{}{}", password, self.pepper)
    }
}
