//! One-shot credential generation for database workloads.
//!
//! Randomness comes from a ChaCha-based generator seeded from the operating
//! system. Seeding failure is fatal: there is no weaker fallback.

use rand::distr::{Alphanumeric, Distribution};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::CredentialError;

/// Length of generated database passwords.
pub const GENERATED_PASSWORD_LENGTH: usize = 24;

/// Username applied when the caller leaves it blank.
pub const DEFAULT_DATABASE_USER: &str = "docklite";

/// Exclusive upper bound for database name-retry suffixes.
pub const RETRY_SUFFIX_BOUND: u32 = 99_999;

/// Secure random source for passwords and name suffixes.
#[derive(Debug)]
pub struct CredentialGenerator<R = StdRng> {
    rng: R,
}

impl CredentialGenerator<StdRng> {
    /// Seed a generator from the operating system.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::RandomSourceUnavailable` if the OS random
    /// source cannot be read.
    pub fn from_os_rng() -> Result<Self, CredentialError> {
        StdRng::try_from_os_rng()
            .map(|rng| Self { rng })
            .map_err(|error| CredentialError::RandomSourceUnavailable {
                message: error.to_string(),
            })
    }
}

impl<R: Rng> CredentialGenerator<R> {
    /// Wrap an existing generator.
    pub const fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate a password drawn uniformly from `[A-Za-z0-9]`.
    pub fn password(&mut self) -> String {
        Alphanumeric
            .sample_iter(&mut self.rng)
            .take(GENERATED_PASSWORD_LENGTH)
            .map(char::from)
            .collect()
    }

    /// Generate a container-name suffix in `[0, RETRY_SUFFIX_BOUND)`.
    pub fn retry_suffix(&mut self) -> u32 {
        self.rng.random_range(0..RETRY_SUFFIX_BOUND)
    }
}

/// Resolve caller-supplied credentials, generating whatever is blank.
///
/// # Errors
///
/// Returns `CredentialError::RandomSourceUnavailable` when a password must
/// be generated and the OS random source is unavailable.
pub fn resolve_credentials(
    username: &str,
    password: &str,
) -> Result<(String, String), CredentialError> {
    let resolved_user = if username.trim().is_empty() {
        String::from(DEFAULT_DATABASE_USER)
    } else {
        String::from(username)
    };
    let resolved_password = if password.is_empty() {
        CredentialGenerator::from_os_rng()?.password()
    } else {
        String::from(password)
    };
    Ok((resolved_user, resolved_password))
}
