/*
[INPUT]:  Operation name, correlation id and operation arguments
[OUTPUT]: Validated outbound request ready for serialization
[POS]:    Data layer - outbound WebSocket operations
[UPDATE]: When adding operations or argument validation rules
*/

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::channel::Validate;
use super::enums::Operation;
use crate::auth::{Credentials, sign};
use crate::error::{OkxError, Result};

/// Outbound operation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request<T> {
    /// Client-chosen correlation token, echoed back by the server.
    /// Up to 32 case-sensitive alphanumerics.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub op: Operation,
    #[serde(default = "Vec::new")]
    pub args: Vec<T>,
}

impl<T> Request<T> {
    /// Build a request with a freshly generated id
    pub fn new(op: Operation, args: Vec<T>) -> Self {
        Self {
            id: new_request_id(),
            op,
            args,
        }
    }
}

impl<T: Validate> Request<T> {
    /// Check the argument list before anything is written
    pub fn validate(&self) -> Result<()> {
        validate_args(&self.args)
    }
}

/// Reject an empty argument list or any argument failing its own rules
pub fn validate_args<T: Validate>(args: &[T]) -> Result<()> {
    if args.is_empty() {
        return Err(OkxError::InvalidArgument("args can't be empty".to_string()));
    }
    for (index, arg) in args.iter().enumerate() {
        arg.validate().map_err(|reason| {
            OkxError::InvalidArgument(format!("args[{index}] is invalid: {reason}"))
        })?;
    }
    Ok(())
}

/// Generate a request id (UUID v4 without hyphens, 32 characters)
pub fn new_request_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Login argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginArg {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub passphrase: String,
    /// Unix epoch time in seconds
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sign: String,
}

impl LoginArg {
    /// Build a signed login argument for the given timestamp
    pub fn new(credentials: &Credentials, timestamp: i64) -> Self {
        Self {
            api_key: credentials.key.clone(),
            passphrase: credentials.passphrase.clone(),
            timestamp: timestamp.to_string(),
            sign: sign(timestamp, credentials),
        }
    }
}

impl Validate for LoginArg {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.api_key.is_empty() {
            return Err("apiKey can't be empty".to_string());
        }
        if self.passphrase.is_empty() {
            return Err("passphrase can't be empty".to_string());
        }
        if self.timestamp.is_empty() || self.sign.is_empty() {
            return Err("login arg is not signed".to_string());
        }
        Ok(())
    }
}
