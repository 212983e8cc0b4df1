//! HMAC signing shared by webhook verification and outgoing requests.

use crate::error::TalkError;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the random seed of an incoming webhook.
pub const HEADER_RANDOM: &str = "X-Nextcloud-Talk-Random";
/// Header carrying the signature of an incoming webhook.
pub const HEADER_SIGNATURE: &str = "X-Nextcloud-Talk-Signature";
/// Header naming the server that sent an incoming webhook.
pub const HEADER_BACKEND: &str = "X-Nextcloud-Talk-Backend";
/// Header carrying the random seed of an outgoing bot request.
pub const HEADER_BOT_RANDOM: &str = "X-Nextcloud-Talk-Bot-Random";
/// Header carrying the signature of an outgoing bot request.
pub const HEADER_BOT_SIGNATURE: &str = "X-Nextcloud-Talk-Bot-Signature";

/// Sign `random ‖ payload` with the shared secret, hex encoded.
pub fn sign(secret: &str, random: &str, payload: &[u8]) -> Result<String, TalkError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| TalkError::InvalidSecret(e.to_string()))?;
    mac.update(random.as_bytes());
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check the signature of an incoming webhook body.
pub fn verify_signature(secret: &str, random: &str, signature: &str, body: &[u8]) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(random.as_bytes());
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Fresh random seed for an outgoing request.
pub fn random_seed() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
