use std::io::Write;

use pat_core::{ExitReason, RetryPolicy, Sleeper, ThreadSleeper};
use pat_directory::{CredentialProbe, DirectoryBinder, LdapBinder, ProbeError, DEFAULT_LDAP_PORT};
use pat_stash::{IssueRequest, StashClient, StashError, TokenIssuer, TokenRecord, TokenRevoker};
use thiserror::Error;
use tracing::info;

use crate::{publish_outputs, Cli, ConfigError, PatAction, PatConfig};

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error(transparent)]
    Stash(#[from] StashError),
    #[error("failed to publish workflow outputs: {0:#}")]
    Output(anyhow::Error),
}

impl RunError {
    pub fn exit_reason(&self) -> ExitReason {
        match self {
            RunError::Config(error) => error.exit_reason(),
            RunError::Probe(error) => error.exit_reason(),
            RunError::Stash(error) => error.exit_reason(),
            RunError::Output(_) => ExitReason::OutputUnavailable,
        }
    }
}

/// Production entry point: LDAP over `ldap3`, real sleeps, stdout workflow commands.
pub fn run(cli: &Cli) -> Result<TokenRecord, RunError> {
    let config = PatConfig::from_cli(cli)?;
    let ldap_port = config
        .directory
        .as_ref()
        .map_or(DEFAULT_LDAP_PORT, |directory| directory.port);
    let binder = LdapBinder::new(ldap_port, config.request_timeout);
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    execute(&config, &binder, ThreadSleeper, &mut stdout)
}

/// Optional directory probe, then exactly one create or revoke, then outputs.
pub fn execute<B, S, W>(
    config: &PatConfig,
    binder: B,
    sleeper: S,
    stdout: &mut W,
) -> Result<TokenRecord, RunError>
where
    B: DirectoryBinder,
    S: Sleeper,
    W: Write,
{
    let policy = RetryPolicy::with_sleeper(config.retry, sleeper);
    let principal = config.credential.principal();

    if let Some(directory) = &config.directory {
        info!(
            hosts = directory.hosts.len(),
            "checking credentials for user {principal} with ldap bind"
        );
        CredentialProbe::new(binder, directory.base_path.as_str()).probe(
            &directory.hosts,
            &config.credential,
            &policy,
        )?;
    }

    let client = StashClient::new(config.endpoint.clone(), config.request_timeout)?;
    let record = match &config.action {
        PatAction::Create => {
            let request = IssueRequest {
                name: config.token_name.clone(),
                grant: config.permissions.grant(),
                validity_days: config.validity_days,
            };
            info!(
                token_name = %request.name,
                permissions = %request.grant,
                validity_days = request.validity_days,
                "requesting personal access token for user {principal}"
            );
            TokenIssuer::new(&client).issue(&config.credential, &request, &policy)?
        }
        PatAction::Revoke { pat_id } => {
            let mut record = TokenRecord::known(pat_id.as_str(), principal);
            TokenRevoker::new(&client).revoke(&config.credential, &mut record, &policy)?;
            record
        }
    };

    publish_outputs(stdout, &config.outputs, principal, &record).map_err(RunError::Output)?;
    Ok(record)
}
