use serde::Deserialize;

/// Session handed over by the identity-provider login flow.
///
/// Only the fields needed to issue PoP tokens are kept; anything else in a
/// serialized session (access token, authorization state, ...) is ignored.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    // Private JWK serialized as JSON. Never leaves the process.
    #[serde(default)]
    pub session_key: Option<String>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("Session")
            .field("client_id", &self.client_id)
            .field("has_id_token", &self.id_token().is_some())
            .field("has_session_key", &self.session_key().is_some())
            .finish()
    }
}

impl Session {
    pub fn new(
        client_id: Option<String>,
        id_token: impl Into<String>,
        session_key: impl Into<String>,
    ) -> Self {
        Self {
            client_id,
            id_token: Some(id_token.into()),
            session_key: Some(session_key.into()),
        }
    }

    /// Parse a session from its JSON form (`clientId`, `idToken`, `sessionKey`).
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    pub fn client_id(&self) -> Option<&str> {
        non_empty(self.client_id.as_deref())
    }

    pub fn id_token(&self) -> Option<&str> {
        non_empty(self.id_token.as_deref())
    }

    pub fn session_key(&self) -> Option<&str> {
        non_empty(self.session_key.as_deref())
    }
}

// Empty strings count as absent.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
