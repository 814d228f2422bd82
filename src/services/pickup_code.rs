use std::future::Future;

use rand::{RngCore, rngs::OsRng};

use crate::error::{AppError, AppResult};

pub const DEFAULT_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const DEFAULT_LENGTH: usize = 6;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Produces short public codes customers present at the counter.
///
/// Each random byte is mapped onto the alphabet with `byte % alphabet.len()`.
/// With 36 symbols the first 4 symbols (`A`..`D`) come up slightly more often
/// than the rest (8/256 vs 7/256). Codes stay compatible with those already
/// issued; switching to rejection sampling would change the distribution.
#[derive(Debug, Clone)]
pub struct PickupCodeGenerator {
    alphabet: Vec<u8>,
    length: usize,
    max_attempts: u32,
}

impl Default for PickupCodeGenerator {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET.to_vec(),
            length: DEFAULT_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl PickupCodeGenerator {
    pub fn new(alphabet: &[u8], length: usize, max_attempts: u32) -> AppResult<Self> {
        if alphabet.is_empty() || !alphabet.is_ascii() {
            return Err(AppError::InvalidArgument(
                "pickup code alphabet must be non-empty ASCII".into(),
            ));
        }
        if length == 0 || max_attempts == 0 {
            return Err(AppError::InvalidArgument(
                "pickup code length and max attempts must be positive".into(),
            ));
        }
        Ok(Self {
            alphabet: alphabet.to_vec(),
            length,
            max_attempts,
        })
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn alphabet(&self) -> &[u8] {
        &self.alphabet
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// One random code, not checked for uniqueness.
    pub fn candidate(&self) -> AppResult<String> {
        let mut bytes = vec![0u8; self.length];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "failed to read random bytes for pickup code: {e}"
            ))
        })?;

        Ok(bytes
            .iter()
            .map(|b| self.alphabet[*b as usize % self.alphabet.len()] as char)
            .collect())
    }

    /// Draws codes until `is_taken` reports a free one.
    ///
    /// Fails with `ResourceExhausted` after `max_attempts` collisions. Errors
    /// from `is_taken` surface as `Internal`.
    pub async fn generate<F, Fut>(&self, mut is_taken: F) -> AppResult<String>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = AppResult<bool>>,
    {
        for attempt in 1..=self.max_attempts {
            let code = self.candidate()?;
            let taken = is_taken(code.clone()).await.map_err(|err| {
                AppError::Internal(
                    anyhow::Error::new(err).context("pickup code uniqueness check failed"),
                )
            })?;
            if !taken {
                return Ok(code);
            }
            tracing::debug!(attempt, "pickup code collision, retrying");
        }

        Err(AppError::ResourceExhausted(format!(
            "failed to generate a unique pickup code after {} attempts",
            self.max_attempts
        )))
    }
}
