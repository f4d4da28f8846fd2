use std::str::FromStr;
use std::time::Duration;

use pat_core::retry::{DEFAULT_MAX_ATTEMPTS, DEFAULT_SECONDS_BETWEEN_ATTEMPTS};
use pat_core::{Credential, ExitReason, PermissionRequest, RetryConfig, SecretString};
use pat_directory::{parse_hosts, DirectorySettings, DEFAULT_LDAP_PORT};
use pat_stash::{token_name, StashEndpoint, DEFAULT_PAT_URI, DEFAULT_REQUEST_TIMEOUT};
use thiserror::Error;

use crate::{Cli, CliMode, OutputTargets};

pub const DEFAULT_VALID_DAYS: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("environment variable '{0}' not found, but is required")]
    Missing(&'static str),
    #[error("invalid value '{value}' for '{name}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn exit_reason(&self) -> ExitReason {
        match self {
            ConfigError::Missing(_) => ExitReason::MissingConfiguration,
            ConfigError::Invalid { .. } => ExitReason::InvalidConfiguration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatAction {
    Create,
    Revoke { pat_id: String },
}

#[derive(Debug)]
/// Settings for one run, validated once and passed by reference afterwards.
pub struct PatConfig {
    pub action: PatAction,
    pub credential: Credential,
    pub endpoint: StashEndpoint,
    pub retry: RetryConfig,
    pub request_timeout: Duration,
    pub validity_days: u32,
    pub permissions: PermissionRequest,
    pub token_name: String,
    pub directory: Option<DirectorySettings>,
    pub outputs: OutputTargets,
}

impl PatConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let username = required("username", cli.username.as_deref())?.trim().to_string();
        let password = required("password", cli.password.as_deref())?.to_string();
        let base_url = required("base_url", cli.base_url.as_deref())?;

        let pat_uri = present(cli.pat_uri.as_deref()).unwrap_or(DEFAULT_PAT_URI);
        let max_attempts = parse_or("max_attempts", cli.max_attempts.as_deref(), DEFAULT_MAX_ATTEMPTS)?;
        let delay_seconds = parse_or(
            "seconds_between_attempts",
            cli.seconds_between_attempts.as_deref(),
            DEFAULT_SECONDS_BETWEEN_ATTEMPTS,
        )?;
        let retry = RetryConfig::new(max_attempts, Duration::from_secs(delay_seconds)).map_err(
            |error| ConfigError::Invalid {
                name: "max_attempts",
                value: max_attempts.to_string(),
                reason: error.to_string(),
            },
        )?;
        let validity_days = parse_or("valid_days", cli.valid_days.as_deref(), DEFAULT_VALID_DAYS)?;
        let request_timeout = match present(cli.request_timeout_seconds.as_deref()) {
            Some(raw) => match parse_value::<u64>("request_timeout_seconds", raw)? {
                0 => {
                    return Err(ConfigError::Invalid {
                        name: "request_timeout_seconds",
                        value: raw.to_string(),
                        reason: "timeout must be at least 1 second".to_string(),
                    })
                }
                seconds => Duration::from_secs(seconds),
            },
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let permissions =
            PermissionRequest::parse(&cli.project_permissions, &cli.repository_permissions)
                .map_err(|error| ConfigError::Invalid {
                    name: "permissions",
                    value: format!(
                        "{}/{}",
                        cli.project_permissions, cli.repository_permissions
                    ),
                    reason: error.to_string(),
                })?;

        let action = match cli.mode {
            CliMode::Create => PatAction::Create,
            CliMode::Revoke => PatAction::Revoke {
                pat_id: required("pat_id", cli.pat_id.as_deref())?.trim().to_string(),
            },
        };

        let directory = if cli.check_using_ldap_bind {
            let base_path = required("ldap_path", cli.ldap_path.as_deref())?.to_string();
            let hosts = parse_hosts(required("ldap_hosts", cli.ldap_hosts.as_deref())?);
            if hosts.is_empty() {
                return Err(ConfigError::Missing("ldap_hosts"));
            }
            let port = parse_or("ldap_port", cli.ldap_port.as_deref(), DEFAULT_LDAP_PORT)?;
            Some(DirectorySettings {
                hosts,
                port,
                base_path,
            })
        } else {
            None
        };

        Ok(Self {
            action,
            credential: Credential::new(username, SecretString::from(password)),
            endpoint: StashEndpoint::new(base_url, pat_uri),
            retry,
            request_timeout,
            validity_days,
            permissions,
            token_name: token_name(cli.github_repository.as_deref()),
            directory,
            outputs: OutputTargets {
                github_output: cli.github_output.clone(),
                github_state: cli.github_state.clone(),
            },
        })
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

fn required<'a>(name: &'static str, value: Option<&'a str>) -> Result<&'a str, ConfigError> {
    present(value).ok_or(ConfigError::Missing(name))
}

fn parse_value<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|error| ConfigError::Invalid {
            name,
            value: raw.to_string(),
            reason: error.to_string(),
        })
}

fn parse_or<T>(name: &'static str, raw: Option<&str>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match present(raw) {
        Some(raw) => parse_value(name, raw),
        None => Ok(default),
    }
}
