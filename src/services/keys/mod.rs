pub mod importer;
pub mod signer;

pub use importer::{ImportedKey, JwkImporter, KeyImporter, public_jwk};
pub use signer::{JoseSigner, Signer};
