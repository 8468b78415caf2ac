use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::IssuerConfig;
use crate::error::PopTokenError;
use crate::services::keys::{JwkImporter, KeyImporter};
use crate::services::pop::core::issue;
use crate::services::pop::types::IssueOptions;
use crate::session::Session;

/// Issues PoP tokens for a session.
///
/// Stateless across calls: the session key is imported afresh every time and
/// nothing is cached, so one issuer can be shared freely between tasks.
#[derive(Clone)]
pub struct PopTokenIssuer {
    importer: Arc<dyn KeyImporter>,
    max_age_seconds: u64,
}

impl std::fmt::Debug for PopTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopTokenIssuer")
            .field("max_age_seconds", &self.max_age_seconds)
            .finish()
    }
}

impl Default for PopTokenIssuer {
    fn default() -> Self {
        Self::from_config(&IssuerConfig::default())
    }
}

impl PopTokenIssuer {
    pub fn new(importer: Arc<dyn KeyImporter>, max_age_seconds: u64) -> Self {
        Self {
            importer,
            max_age_seconds,
        }
    }

    /// Issuer importing JWKs restricted to `config.allowed_algorithms`.
    pub fn from_config(config: &IssuerConfig) -> Self {
        Self::new(Arc::new(JwkImporter::new(config)), config.max_age_seconds)
    }

    pub fn max_age_seconds(&self) -> u64 {
        self.max_age_seconds
    }

    /// Issue a compact PoP token for `resource_server_uri`.
    ///
    /// Session fields are checked before the key is imported: a session without
    /// `sessionKey` or `idToken` fails with `MissingCredential` and never
    /// reaches the importer.
    pub async fn issue_for(
        &self,
        resource_server_uri: &str,
        session: &Session,
    ) -> Result<String, PopTokenError> {
        self.issue_for_at(resource_server_uri, session, None).await
    }

    /// `issue_for` with an explicit issued-at (seconds since epoch); `None` means now.
    pub async fn issue_for_at(
        &self,
        resource_server_uri: &str,
        session: &Session,
        iat: Option<i64>,
    ) -> Result<String, PopTokenError> {
        let session_key = session.session_key().ok_or_else(|| {
            warn!("cannot issue PoP token: session has no session key");
            PopTokenError::MissingCredential("session key")
        })?;
        let id_token = session.id_token().ok_or_else(|| {
            warn!("cannot issue PoP token: session has no id token");
            PopTokenError::MissingCredential("id token")
        })?;

        let key = self.importer.import(session_key).await?;

        let mut options = IssueOptions::new(
            resource_server_uri,
            session.client_id().map(str::to_string),
            key,
            id_token,
        )
        .with_max(self.max_age_seconds);
        options.iat = iat;

        let token = issue(options);
        let encoded = token.encode()?;

        debug!(
            aud = %resource_server_uri,
            iss = ?token.claims().iss,
            exp = token.claims().exp,
            "Issued PoP token"
        );

        Ok(encoded)
    }
}
