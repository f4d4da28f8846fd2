use secrecy::SecretString;

/// Value that replaces a token secret once Stash confirmed the revocation.
pub const REVOKED_TOKEN_SENTINEL: &str = "revoked";

#[derive(Debug)]
/// Personal access token owned by the orchestrator for the rest of the run.
pub struct TokenRecord {
    id: String,
    owner_principal: String,
    secret: Option<SecretString>,
    revoked: bool,
}

impl TokenRecord {
    pub fn issued(
        id: impl Into<String>,
        secret: SecretString,
        owner_principal: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            owner_principal: owner_principal.into(),
            secret: Some(secret),
            revoked: false,
        }
    }

    /// A token known only by id, as handed to the revoke mode.
    pub fn known(id: impl Into<String>, owner_principal: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owner_principal: owner_principal.into(),
            secret: None,
            revoked: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner_principal(&self) -> &str {
        &self.owner_principal
    }

    pub fn secret(&self) -> Option<&SecretString> {
        self.secret.as_ref()
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    pub(crate) fn invalidate(&mut self) {
        self.secret = Some(SecretString::from(REVOKED_TOKEN_SENTINEL.to_string()));
        self.revoked = true;
    }
}
