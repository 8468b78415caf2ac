//! Session key import (serialized JWK -> `ImportedKey`).
//!
//! Import is the only suspending step of issuance. It is modelled as its own
//! trait so callers can plug in a different key source (KMS, keyring, ...)
//! and tests can observe whether an import happened at all.

use std::{future::Future, pin::Pin, sync::Arc};

use josekit::jwk::Jwk;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::IssuerConfig;
use crate::error::PopTokenError;
use crate::services::keys::signer::{JoseSigner, Signer};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// JWK members that carry private key material (RFC 7518 section 6).
const PRIVATE_MEMBERS: &[&str] = &["d", "p", "q", "dp", "dq", "qi", "oth", "k"];

/// A key ready for signing: its declared algorithm plus signing material.
///
/// Either part may be missing; that is only an error once a token is encoded.
#[derive(Clone, Default)]
pub struct ImportedKey {
    alg: Option<String>,
    signer: Option<Arc<dyn Signer>>,
}

impl std::fmt::Debug for ImportedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportedKey")
            .field("alg", &self.alg)
            .field("has_signer", &self.signer.is_some())
            .finish()
    }
}

impl ImportedKey {
    pub fn new(alg: Option<String>, signer: Option<Arc<dyn Signer>>) -> Self {
        Self { alg, signer }
    }

    /// Key whose declared algorithm is the signer's own.
    pub fn from_signer(signer: Arc<dyn Signer>) -> Self {
        Self {
            alg: Some(signer.algorithm().to_string()),
            signer: Some(signer),
        }
    }

    pub fn alg(&self) -> Option<&str> {
        self.alg.as_deref()
    }

    pub fn signer(&self) -> Option<&dyn Signer> {
        self.signer.as_deref()
    }
}

/// Turns a serialized session key into an `ImportedKey`.
pub trait KeyImporter: Send + Sync {
    fn import<'a>(&'a self, serialized: &'a str) -> BoxFuture<'a, Result<ImportedKey, PopTokenError>>;
}

/// Default importer: JSON Web Keys, restricted to an algorithm allow-list.
#[derive(Clone, Debug)]
pub struct JwkImporter {
    allowed_algorithms: Vec<String>,
}

impl Default for JwkImporter {
    fn default() -> Self {
        Self::new(&IssuerConfig::default())
    }
}

impl JwkImporter {
    pub fn new(config: &IssuerConfig) -> Self {
        Self {
            allowed_algorithms: config.allowed_algorithms.clone(),
        }
    }

    /// Synchronous body of `import`.
    pub fn import_jwk(&self, serialized: &str) -> Result<ImportedKey, PopTokenError> {
        let jwk = parse_jwk(serialized)?;

        let alg = match jwk.algorithm().map(str::to_string).or_else(|| infer_alg(&jwk)) {
            Some(alg) => alg,
            None => {
                debug!(kty = %jwk.key_type(), "session key declares no alg and none can be inferred");
                return Ok(ImportedKey::default());
            }
        };

        if !self.allowed_algorithms.iter().any(|a| *a == alg) {
            warn!(alg = %alg, "session key algorithm is not allowed");
            return Err(PopTokenError::key_import(format!(
                "unsupported algorithm: {alg}"
            )));
        }

        if jwk.parameter("d").is_none() {
            debug!(alg = %alg, "session key has no private material");
            return Ok(ImportedKey::new(Some(alg), None));
        }

        let signer = JoseSigner::from_jwk(&alg, &jwk).map_err(|e| {
            warn!(alg = %alg, error = %e, "failed to build signer from session key");
            e
        })?;

        Ok(ImportedKey::new(Some(alg), Some(Arc::new(signer))))
    }
}

impl KeyImporter for JwkImporter {
    fn import<'a>(&'a self, serialized: &'a str) -> BoxFuture<'a, Result<ImportedKey, PopTokenError>> {
        Box::pin(async move { self.import_jwk(serialized) })
    }
}

// Algorithm implied by the key type when the JWK omits `alg`.
// RSA keys serve several algorithms (RS*, PS*), so nothing is inferred for them.
fn infer_alg(jwk: &Jwk) -> Option<String> {
    let crv = jwk.parameter("crv").and_then(Value::as_str);
    let alg = match (jwk.key_type(), crv) {
        ("EC", Some("P-256")) => "ES256",
        ("EC", Some("P-384")) => "ES384",
        ("OKP", Some("Ed25519")) => "EdDSA",
        _ => return None,
    };
    Some(alg.to_string())
}

fn parse_jwk(serialized: &str) -> Result<Jwk, PopTokenError> {
    // Syntax errors are reported before josekit's structural checks.
    parse_jwk_members(serialized)?;

    Jwk::from_bytes(serialized.as_bytes()).map_err(|e| {
        warn!(error = %e, "invalid session key JWK");
        PopTokenError::key_import(e.to_string())
    })
}

fn parse_jwk_members(serialized: &str) -> Result<Map<String, Value>, PopTokenError> {
    let value: Value = serde_json::from_str(serialized).map_err(|e| {
        warn!(error = %e, "session key is not valid JSON");
        PopTokenError::key_import(format!("malformed JSON: {e}"))
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(PopTokenError::key_import("expected a JSON object")),
    }
}

/// Public half of a serialized JWK: every private member removed.
pub fn public_jwk(serialized: &str) -> Result<Map<String, Value>, PopTokenError> {
    let mut map = parse_jwk_members(serialized)?;
    for member in PRIVATE_MEMBERS {
        map.remove(*member);
    }
    Ok(map)
}
