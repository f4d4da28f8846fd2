use secrecy::SecretString;

#[derive(Debug)]
/// Principal plus password used for directory binds and Stash basic auth.
///
/// The password stays wrapped in [`SecretString`], so `Debug` output and
/// tracing fields never carry it in clear text.
pub struct Credential {
    principal: String,
    secret: SecretString,
}

impl Credential {
    pub fn new(principal: impl Into<String>, secret: SecretString) -> Self {
        Self {
            principal: principal.into(),
            secret,
        }
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn secret(&self) -> &SecretString {
        &self.secret
    }
}
