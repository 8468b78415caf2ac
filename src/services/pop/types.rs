use serde::{Deserialize, Serialize};

use crate::services::keys::ImportedKey;

/// Fixed value of the `token_type` claim.
pub const POP_TOKEN_TYPE: &str = "pop";

/// `aud` claim: a single resource server or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    pub fn contains(&self, aud: &str) -> bool {
        match self {
            Audience::One(one) => one == aud,
            Audience::Many(many) => many.iter().any(|a| a == aud),
        }
    }
}

impl From<&str> for Audience {
    fn from(aud: &str) -> Self {
        Audience::One(aud.to_string())
    }
}

impl From<String> for Audience {
    fn from(aud: String) -> Self {
        Audience::One(aud)
    }
}

impl From<Vec<String>> for Audience {
    fn from(aud: Vec<String>) -> Self {
        Audience::Many(aud)
    }
}

/// PoP token JOSE header. Only `alg` is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopHeader {
    pub alg: String,
}

/// PoP token claims, serialized in this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopClaims {
    // Client id of the relying party asserting possession
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    pub aud: Audience,
    pub exp: i64,
    pub iat: i64,
    // Compact-encoded ID token, embedded verbatim
    #[serde(default)]
    pub id_token: String,
    #[serde(default)]
    pub token_type: String,
}

/// Inputs of the lower-level `issue` constructor.
#[derive(Debug, Clone)]
pub struct IssueOptions {
    pub aud: Audience,
    pub iss: Option<String>,
    pub key: ImportedKey,
    pub id_token: String,
    // Issued-at, seconds since epoch. Default: now.
    pub iat: Option<i64>,
    // Lifetime in seconds. Default: `DEFAULT_MAX_AGE_SECONDS`.
    pub max: Option<u64>,
}

impl IssueOptions {
    pub fn new(
        aud: impl Into<Audience>,
        iss: Option<String>,
        key: ImportedKey,
        id_token: impl Into<String>,
    ) -> Self {
        Self {
            aud: aud.into(),
            iss,
            key,
            id_token: id_token.into(),
            iat: None,
            max: None,
        }
    }

    pub fn with_iat(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    pub fn with_max(mut self, max: u64) -> Self {
        self.max = Some(max);
        self
    }
}
