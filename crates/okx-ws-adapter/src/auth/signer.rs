/*
[INPUT]:  Unix timestamp (seconds) and credentials
[OUTPUT]: Base64-encoded HMAC-SHA256 login signature
[POS]:    Auth layer - WebSocket login signing
[UPDATE]: When changing signing algorithm or prehash format
*/

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::Credentials;

type HmacSha256 = Hmac<Sha256>;

/// HTTP method folded into the login prehash
pub const SIGN_METHOD: &str = "GET";
/// Request path folded into the login prehash
pub const SIGN_REQUEST_PATH: &str = "/users/self/verify";

/// Sign a login request
///
/// Prehash: "{timestamp}GET/users/self/verify", keyed by the secret key.
/// Returns base64-encoded signature
pub fn sign(timestamp: i64, credentials: &Credentials) -> String {
    // HMAC accepts keys of any length, including empty.
    let mut mac = HmacSha256::new_from_slice(credentials.secret_key.as_bytes())
        .unwrap_or_else(|_| unreachable!("hmac key length is unrestricted"));
    mac.update(timestamp.to_string().as_bytes());
    mac.update(SIGN_METHOD.as_bytes());
    mac.update(SIGN_REQUEST_PATH.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}
