use std::time::Duration;

use ldap3::{LdapConn, LdapConnSettings};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_LDAP_PORT: u16 = 389;
const LDAP_INVALID_CREDENTIALS: u32 = 49;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of a bind that reached the directory.
pub enum BindStatus {
    Bound,
    Rejected { code: u32, message: String },
}

impl BindStatus {
    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, BindStatus::Rejected { code, .. } if *code == LDAP_INVALID_CREDENTIALS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("failed to connect to {url}: {message}")]
    Connect { url: String, message: String },
    #[error("bind request to {url} failed: {message}")]
    Bind { url: String, message: String },
}

/// Performs one simple bind against a directory host.
pub trait DirectoryBinder {
    fn bind(
        &self,
        host: &str,
        bind_dn: &str,
        password: &SecretString,
    ) -> Result<BindStatus, DirectoryError>;
}

impl<B: DirectoryBinder + ?Sized> DirectoryBinder for &B {
    fn bind(
        &self,
        host: &str,
        bind_dn: &str,
        password: &SecretString,
    ) -> Result<BindStatus, DirectoryError> {
        (**self).bind(host, bind_dn, password)
    }
}

#[derive(Debug, Clone)]
/// `ldap3` binder: plain `ldap://` (no TLS, no StartTLS), LDAPv3 simple bind.
pub struct LdapBinder {
    port: u16,
    timeout: Duration,
}

impl LdapBinder {
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    pub fn url_for(&self, host: &str) -> String {
        let host = host.trim();
        if host.contains("://") {
            return host.to_string();
        }
        if has_explicit_port(host) {
            return format!("ldap://{host}");
        }
        format!("ldap://{}:{}", host, self.port)
    }
}

fn has_explicit_port(host: &str) -> bool {
    match host.rsplit_once(':') {
        Some((name, port)) => {
            !port.is_empty()
                && port.bytes().all(|byte| byte.is_ascii_digit())
                && (!name.contains(':') || name.ends_with(']'))
        }
        None => false,
    }
}

impl DirectoryBinder for LdapBinder {
    fn bind(
        &self,
        host: &str,
        bind_dn: &str,
        password: &SecretString,
    ) -> Result<BindStatus, DirectoryError> {
        let url = self.url_for(host);
        debug!(url = %url, bind_dn, "connecting to directory host");

        let settings = LdapConnSettings::new().set_conn_timeout(self.timeout);
        let mut ldap =
            LdapConn::with_settings(settings, &url).map_err(|error| DirectoryError::Connect {
                url: url.clone(),
                message: error.to_string(),
            })?;

        let result = ldap
            .with_timeout(self.timeout)
            .simple_bind(bind_dn, password.expose_secret())
            .map_err(|error| DirectoryError::Bind {
                url: url.clone(),
                message: error.to_string(),
            })?;
        if let Err(error) = ldap.unbind() {
            debug!(url = %url, error = %error, "directory unbind failed");
        }

        if result.rc == 0 {
            return Ok(BindStatus::Bound);
        }
        Ok(BindStatus::Rejected {
            code: result.rc,
            message: result.text,
        })
    }
}
