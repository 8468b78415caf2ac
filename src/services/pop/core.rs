//! PoP token construction (`issue`) and compact serialization (`encode`).
//!
//! This module is pure: no key import, no I/O. `issue` only assembles the
//! header and claims; the signature is produced lazily by `PopToken::encode`.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Serialize;

use crate::config::DEFAULT_MAX_AGE_SECONDS;
use crate::error::PopTokenError;
use crate::services::keys::ImportedKey;
use crate::services::pop::types::{IssueOptions, POP_TOKEN_TYPE, PopClaims, PopHeader};

/// An issued, not yet signed, PoP token.
#[derive(Debug, Clone)]
pub struct PopToken {
    alg: Option<String>,
    claims: PopClaims,
    key: ImportedKey,
}

/// Build a PoP token from already imported key material.
///
/// - `iat` defaults to the current time (seconds); `max` to 3600 seconds.
///   Zero counts as unset for both.
/// - `alg` is taken from the key as declared; nothing is negotiated here.
pub fn issue(options: IssueOptions) -> PopToken {
    let IssueOptions {
        aud,
        iss,
        key,
        id_token,
        iat,
        max,
    } = options;

    let iat = iat.filter(|v| *v != 0).unwrap_or_else(now_seconds);
    let max = max.filter(|v| *v != 0).unwrap_or(DEFAULT_MAX_AGE_SECONDS);
    let exp = iat.saturating_add(i64::try_from(max).unwrap_or(i64::MAX));

    PopToken {
        alg: key.alg().map(str::to_string),
        claims: PopClaims {
            iss,
            aud,
            exp,
            iat,
            id_token,
            token_type: POP_TOKEN_TYPE.to_string(),
        },
        key,
    }
}

impl PopToken {
    /// Header as it will be encoded, if the key declared an algorithm.
    pub fn header(&self) -> Option<PopHeader> {
        self.alg.as_ref().map(|alg| PopHeader { alg: alg.clone() })
    }

    pub fn claims(&self) -> &PopClaims {
        &self.claims
    }

    /// Sign and serialize as `base64url(header).base64url(payload).base64url(signature)`.
    pub fn encode(&self) -> Result<String, PopTokenError> {
        let header = self
            .header()
            .ok_or_else(|| PopTokenError::invalid_key("key declares no algorithm"))?;
        let signer = self
            .key
            .signer()
            .ok_or_else(|| PopTokenError::invalid_key("key has no signing material"))?;

        if signer.algorithm() != header.alg {
            return Err(PopTokenError::invalid_key(format!(
                "key declares {} but signs with {}",
                header.alg,
                signer.algorithm()
            )));
        }

        let signing_input = format!("{}.{}", b64url_json(&header)?, b64url_json(&self.claims)?);
        let signature = signer.sign(signing_input.as_bytes())?;

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }
}

fn b64url_json<T: Serialize>(value: &T) -> Result<String, PopTokenError> {
    let json = serde_json::to_vec(value)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn now_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}
