use josekit::jwk::Jwk;
use josekit::jws::{
    ES256, ES384, EdDSA, JwsSigner, PS256, PS384, PS512, RS256, RS384, RS512,
};

use crate::error::PopTokenError;

/// Signing capability used at encode time.
///
/// Takes the JWS signing input and returns raw signature bytes under the
/// declared algorithm. ECDSA implementations return the fixed-size `r || s`
/// form required by JWS.
pub trait Signer: Send + Sync {
    fn algorithm(&self) -> &str;

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, PopTokenError>;
}

/// `Signer` backed by a josekit JWS signer built from a private JWK.
pub struct JoseSigner {
    alg: String,
    inner: Box<dyn JwsSigner>,
}

impl std::fmt::Debug for JoseSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("JoseSigner").field("alg", &self.alg).finish()
    }
}

impl JoseSigner {
    /// Build a signer for `alg` from a JWK holding private key material.
    pub fn from_jwk(alg: &str, jwk: &Jwk) -> Result<Self, PopTokenError> {
        let inner: Box<dyn JwsSigner> = match alg {
            "ES256" => Box::new(ES256.signer_from_jwk(jwk).map_err(import_error)?),
            "ES384" => Box::new(ES384.signer_from_jwk(jwk).map_err(import_error)?),
            "RS256" => Box::new(RS256.signer_from_jwk(jwk).map_err(import_error)?),
            "RS384" => Box::new(RS384.signer_from_jwk(jwk).map_err(import_error)?),
            "RS512" => Box::new(RS512.signer_from_jwk(jwk).map_err(import_error)?),
            "PS256" => Box::new(PS256.signer_from_jwk(jwk).map_err(import_error)?),
            "PS384" => Box::new(PS384.signer_from_jwk(jwk).map_err(import_error)?),
            "PS512" => Box::new(PS512.signer_from_jwk(jwk).map_err(import_error)?),
            "EdDSA" => Box::new(EdDSA.signer_from_jwk(jwk).map_err(import_error)?),
            other => {
                return Err(PopTokenError::key_import(format!(
                    "unsupported algorithm: {other}"
                )));
            }
        };

        Ok(Self {
            alg: alg.to_string(),
            inner,
        })
    }
}

impl Signer for JoseSigner {
    fn algorithm(&self) -> &str {
        &self.alg
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, PopTokenError> {
        self.inner
            .sign(message)
            .map_err(|e| PopTokenError::invalid_key(format!("signing failed: {e}")))
    }
}

fn import_error(e: josekit::JoseError) -> PopTokenError {
    PopTokenError::key_import(e.to_string())
}
