/*
[INPUT]:  API key, passphrase and secret supplied by the application
[OUTPUT]: Credentials value with non-empty validation
[POS]:    Auth layer - credential storage
[UPDATE]: When credential fields or validation rules change
*/

use std::fmt;

use crate::error::{OkxError, Result};

/// OKX API key triple
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// API key
    pub key: String,
    /// API key passphrase
    pub passphrase: String,
    /// API secret key, used only for signing
    pub secret_key: String,
}

impl Credentials {
    pub fn new(
        key: impl Into<String>,
        passphrase: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            passphrase: passphrase.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Reject credentials with any empty field
    pub fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(OkxError::Config("api key can't be empty".to_string()));
        }
        if self.passphrase.is_empty() {
            return Err(OkxError::Config("passphrase can't be empty".to_string()));
        }
        if self.secret_key.is_empty() {
            return Err(OkxError::Config("secret key can't be empty".to_string()));
        }
        Ok(())
    }
}

// Keep secrets out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("passphrase", &"***")
            .field("secret_key", &"***")
            .finish()
    }
}
