use pat_core::{Credential, ExitReason, OperationOutcome, RetryError, RetryPolicy, Sleeper};
use thiserror::Error;
use tracing::info;

use crate::binder::{BindStatus, DirectoryBinder};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Directory hosts and the DN template used for the readiness check.
pub struct DirectorySettings {
    pub hosts: Vec<String>,
    pub port: u16,
    pub base_path: String,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("password for user {principal} never became valid with {host}")]
    Exhausted {
        host: String,
        principal: String,
        #[source]
        source: RetryError,
    },
}

impl ProbeError {
    pub fn exit_reason(&self) -> ExitReason {
        match self {
            ProbeError::Exhausted { .. } => ExitReason::DirectoryBindExhausted,
        }
    }
}

/// Distinguished name bound for `principal`, e.g. `CN=deploy-bot,OU=Service,DC=corp`.
pub fn bind_dn(principal: &str, base_path: &str) -> String {
    format!("CN={},{}", principal, base_path.trim())
}

/// Splits a comma-separated host list, dropping blank entries.
pub fn parse_hosts(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

pub struct CredentialProbe<B> {
    binder: B,
    base_path: String,
}

impl<B: DirectoryBinder> CredentialProbe<B> {
    pub fn new(binder: B, base_path: impl Into<String>) -> Self {
        Self {
            binder,
            base_path: base_path.into(),
        }
    }

    /// Binds against every host in order, each with its own full retry
    /// budget. The first host that never accepts the credential aborts the
    /// probe; later hosts are not tried.
    pub fn probe<S: Sleeper>(
        &self,
        hosts: &[String],
        credential: &Credential,
        policy: &RetryPolicy<S>,
    ) -> Result<(), ProbeError> {
        let principal = credential.principal();
        let dn = bind_dn(principal, &self.base_path);
        for host in hosts {
            let operation = format!("ldap bind {host}");
            policy
                .execute(&operation, |_| {
                    self.attempt_bind(host, &dn, credential)
                })
                .map_err(|source| ProbeError::Exhausted {
                    host: host.clone(),
                    principal: principal.to_string(),
                    source,
                })?;
            info!(host = %host, principal, "password for user {principal} is valid with {host}");
        }
        Ok(())
    }

    fn attempt_bind(
        &self,
        host: &str,
        dn: &str,
        credential: &Credential,
    ) -> OperationOutcome<()> {
        let principal = credential.principal();
        match self.binder.bind(host, dn, credential.secret()) {
            Ok(BindStatus::Bound) => OperationOutcome::Success(()),
            Ok(status @ BindStatus::Rejected { .. }) if status.is_invalid_credentials() => {
                OperationOutcome::TransientFailure(format!(
                    "password for user {principal} not (yet) valid with {host}"
                ))
            }
            Ok(BindStatus::Rejected { code, message }) => OperationOutcome::TransientFailure(
                format!("bind for user {principal} rejected by {host} (code {code}): {message}"),
            ),
            Err(error) => OperationOutcome::TransientFailure(format!(
                "exception trying username + password on {host}: {error}"
            )),
        }
    }
}
