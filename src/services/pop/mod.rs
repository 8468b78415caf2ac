pub mod core;
pub mod issuer;
pub mod types;
pub mod verify;

pub use self::core::{PopToken, issue};
pub use issuer::PopTokenIssuer;
pub use types::{Audience, IssueOptions, POP_TOKEN_TYPE, PopClaims, PopHeader};
pub use verify::{PopTokenVerifier, VerifyError, decode_claims};
