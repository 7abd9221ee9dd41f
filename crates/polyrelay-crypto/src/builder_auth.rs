//! HMAC-SHA256 request authentication for the Builder API.
//!
//! The signed message is the concatenation `timestamp || method || path ||
//! body` with no separators; the server reconstructs the same string from
//! the request it receives, so any mismatch in path or body invalidates
//! the signature.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use hmac::{Hmac, Mac};
use polyrelay_types::{RelayError, Result};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the request signature for the Builder API.
///
/// The shared secret is URL-safe base64 with padding; any other encoding
/// is rejected rather than guessed at. The returned signature is standard
/// base64 with `+` and `/` mapped to their URL-safe counterparts, which
/// keeps the padding `=` the server expects.
pub fn build_hmac_signature(
    secret: &str,
    timestamp: i64,
    method: &str,
    path: &str,
    body: Option<&str>,
) -> Result<String> {
    let key = URL_SAFE
        .decode(secret)
        .map_err(|e| RelayError::InvalidCredentials(format!("invalid builder secret: {}", e)))?;

    let mut mac = HmacSha256::new_from_slice(&key)
        .map_err(|e| RelayError::InvalidCredentials(format!("invalid hmac key: {}", e)))?;

    let message = format!("{}{}{}{}", timestamp, method, path, body.unwrap_or(""));
    mac.update(message.as_bytes());

    let digest = mac.finalize().into_bytes();
    Ok(STANDARD.encode(digest).replace('+', "-").replace('/', "_"))
}
