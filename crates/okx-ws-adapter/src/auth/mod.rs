/*
[INPUT]:  API key triple (key, passphrase, secret) and a login timestamp
[OUTPUT]: Validated credentials and HMAC-SHA256 login signatures
[POS]:    Auth layer - handles OKX WebSocket login material
[UPDATE]: When the signing prehash or credential rules change
*/

pub mod credentials;
pub mod signer;

pub use credentials::Credentials;
pub use signer::{SIGN_METHOD, SIGN_REQUEST_PATH, sign};
