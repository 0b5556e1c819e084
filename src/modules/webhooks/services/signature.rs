//! Webhook signature verification

use crate::core::{AppError, Result};
use actix_web::http::header::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Headers that may carry the signature, in lookup order
pub const SIGNATURE_HEADERS: [&str; 4] = [
    "X-Signature-Key",
    "X-Signature",
    "Signature-Key",
    "X-Callback-Signature",
];

/// First non-empty signature header value
pub fn extract_signature(headers: &HeaderMap) -> Option<&str> {
    SIGNATURE_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    })
}

/// HMAC-SHA512 over the raw request body, hex encoded
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self) -> Result<HmacSha512> {
        HmacSha512::new_from_slice(self.secret.as_bytes())
            .map_err(|e| AppError::internal(format!("Invalid webhook key: {}", e)))
    }

    /// Hex signature for `payload`
    pub fn sign(&self, payload: &[u8]) -> Result<String> {
        let mut mac = self.mac()?;
        mac.update(payload);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Check `signature` against `payload` in constant time
    pub fn verify(&self, payload: &[u8], signature: Option<&str>) -> Result<()> {
        let signature = signature.ok_or_else(|| AppError::unauthorized("Missing signature"))?;

        let expected = hex::decode(signature.trim())
            .map_err(|_| AppError::unauthorized("Invalid signature"))?;

        let mut mac = self.mac()?;
        mac.update(payload);
        mac.verify_slice(&expected)
            .map_err(|_| AppError::unauthorized("Invalid signature"))
    }
}

// Keeps the key out of debug logs.
impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"<redacted>")
            .finish()
    }
}
