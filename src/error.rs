/*
 * Responsibility
 * - PoP token issuance errors (PopTokenError)
 * - Every variant is terminal for a single issuance: no retries, no partial tokens
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PopTokenError {
    // Required session field is absent or empty (`sessionKey`, `idToken`).
    #[error("cannot issue PoP token: missing {0}")]
    MissingCredential(&'static str),

    // Session key could not be parsed or imported (malformed JSON, unsupported alg, ...).
    #[error("cannot import session key: {0}")]
    KeyImport(String),

    // Key cannot produce a signature (no alg, no private material, signer failure).
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("cannot encode PoP token: {0}")]
    Encode(String),
}

impl PopTokenError {
    pub fn key_import(message: impl Into<String>) -> Self {
        Self::KeyImport(message.into())
    }

    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey(message.into())
    }
}

impl From<serde_json::Error> for PopTokenError {
    fn from(e: serde_json::Error) -> Self {
        Self::Encode(e.to_string())
    }
}
