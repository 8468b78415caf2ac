//! PoP token verification against the session's public key.
//!
//! Resource-server side counterpart of `issue_for`: signature, `exp`, `aud`
//! and (optionally) `iss` are checked by jsonwebtoken; the PoP-specific claims
//! are checked here.

use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, jwk::Jwk};
use serde_json::Value;
use tracing::warn;

use crate::config::IssuerConfig;
use crate::services::keys::public_jwk;
use crate::services::pop::types::{POP_TOKEN_TYPE, PopClaims};

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("invalid verification key: {0}")]
    InvalidKey(String),
    #[error("unsupported PoP token alg: {0:?}")]
    UnsupportedAlg(Algorithm),
    #[error("invalid PoP token")]
    InvalidToken,
    #[error("token_type is not \"pop\"")]
    NotPopToken,
    #[error("missing required claim: {0}")]
    MissingClaim(&'static str),
    #[error("exp is not after iat")]
    InvalidLifetime,
}

#[derive(Clone)]
pub struct PopTokenVerifier {
    decoding_key: DecodingKey,
    allowed_algorithms: Vec<Algorithm>,
    audience: String,
    issuer: Option<String>,
    leeway_seconds: u64,
}

impl std::fmt::Debug for PopTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("PopTokenVerifier")
            .field("allowed_algorithms", &self.allowed_algorithms)
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl PopTokenVerifier {
    /// `jwk` may be the session's private JWK; private members are dropped first.
    pub fn new(jwk: &str, audience: impl Into<String>) -> Result<Self, VerifyError> {
        Self::from_config(jwk, audience, &IssuerConfig::default())
    }

    pub fn from_config(
        jwk: &str,
        audience: impl Into<String>,
        config: &IssuerConfig,
    ) -> Result<Self, VerifyError> {
        let members = public_jwk(jwk).map_err(|e| VerifyError::InvalidKey(e.to_string()))?;
        let jwk: Jwk = serde_json::from_value(Value::Object(members)).map_err(|e| {
            warn!(error = %e, "unsupported verification JWK");
            VerifyError::InvalidKey(e.to_string())
        })?;
        let decoding_key =
            DecodingKey::from_jwk(&jwk).map_err(|e| VerifyError::InvalidKey(e.to_string()))?;

        let allowed_algorithms = config
            .allowed_algorithms
            .iter()
            .map(|alg| {
                Algorithm::from_str(alg)
                    .map_err(|_| VerifyError::InvalidKey(format!("unknown algorithm: {alg}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            decoding_key,
            allowed_algorithms,
            audience: audience.into(),
            issuer: None,
            leeway_seconds: 0,
        })
    }

    /// Also require `iss` to equal the relying party's client id.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Allowed clock skew for `exp`, seconds.
    pub fn with_leeway(mut self, leeway_seconds: u64) -> Self {
        self.leeway_seconds = leeway_seconds;
        self
    }

    pub fn verify(&self, token: &str) -> Result<PopClaims, VerifyError> {
        let header = jsonwebtoken::decode_header(token).map_err(|e| {
            warn!(error = ?e, "invalid PoP token header");
            VerifyError::InvalidToken
        })?;

        if !self.allowed_algorithms.contains(&header.alg) {
            return Err(VerifyError::UnsupportedAlg(header.alg));
        }

        let mut validation = Validation::new(header.alg);
        validation.set_audience(&[&self.audience]);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation.set_required_spec_claims(&["exp", "aud"]);
        validation.leeway = self.leeway_seconds;

        let claims = jsonwebtoken::decode::<PopClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                warn!(error = ?e, "invalid PoP token");
                VerifyError::InvalidToken
            })?
            .claims;

        if claims.token_type != POP_TOKEN_TYPE {
            return Err(VerifyError::NotPopToken);
        }
        if claims.id_token.trim().is_empty() {
            return Err(VerifyError::MissingClaim("id_token"));
        }
        if claims.exp <= claims.iat {
            return Err(VerifyError::InvalidLifetime);
        }

        Ok(claims)
    }
}

/// Read the claims of a compact token without checking its signature.
///
/// For display and debugging only; never use the result for authorization.
pub fn decode_claims(token: &str) -> Result<PopClaims, VerifyError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(VerifyError::InvalidToken),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| VerifyError::InvalidToken)?;
    serde_json::from_slice(&bytes).map_err(|_| VerifyError::InvalidToken)
}
