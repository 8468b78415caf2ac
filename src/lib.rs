//! Proof-of-Possession (PoP) tokens for OpenID Connect sessions.
//!
//! A PoP token is a short-lived JWT signed with the session's private key. It
//! binds the session's ID token to a resource server (`aud`) so the resource
//! server can check that the caller actually holds the session key.
//!
//! Issuance is two-phase: the serialized session key is imported (async,
//! fallible), then the token is built and signed (sync, pure).
//!
//! ```no_run
//! # async fn run() -> Result<(), pop_token::PopTokenError> {
//! use pop_token::{PopTokenIssuer, Session};
//!
//! let session = Session::from_json(&std::fs::read_to_string("session.json").unwrap()).unwrap();
//! let token = PopTokenIssuer::default()
//!     .issue_for("https://rs.example/", &session)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod services;
pub mod session;

pub use config::{ConfigError, DEFAULT_MAX_AGE_SECONDS, IssuerConfig};
pub use error::PopTokenError;
pub use services::keys::{ImportedKey, JoseSigner, JwkImporter, KeyImporter, Signer, public_jwk};
pub use services::pop::{
    Audience, IssueOptions, POP_TOKEN_TYPE, PopClaims, PopHeader, PopToken, PopTokenIssuer,
    PopTokenVerifier, VerifyError, decode_claims, issue,
};
pub use session::Session;
