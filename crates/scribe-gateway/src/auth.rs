// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handshake signing: a fresh nonce per connection attempt, signed with
//! HMAC-SHA256 under the shared gateway secret.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Generate a fresh 16-byte nonce, hex encoded.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Sign a nonce with HMAC-SHA256, returning the hex digest.
///
/// Note: `new_from_slice` only fails for algorithms with key length
/// constraints. HMAC-SHA256 accepts any key length, so this is infallible.
pub fn sign_nonce(secret: &str, nonce: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC-SHA256 accepts any key length");
    mac.update(nonce.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a hex HMAC-SHA256 signature over `nonce`.
///
/// Comparison happens in constant time via `Mac::verify_slice`. Malformed
/// hex fails verification rather than erroring.
pub fn verify_nonce(secret: &str, nonce: &str, signature: &str) -> bool {
    let Ok(sig_bytes) = hex::decode(signature) else {
        return false;
    };
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC-SHA256 accepts any key length");
    mac.update(nonce.as_bytes());
    mac.verify_slice(&sig_bytes).is_ok()
}
