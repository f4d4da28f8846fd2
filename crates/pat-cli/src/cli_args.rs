use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliMode {
    Create,
    Revoke,
}

impl CliMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CliMode::Create => "create",
            CliMode::Revoke => "revoke",
        }
    }
}

#[derive(Parser)]
#[command(
    name = "pat-helper",
    about = "Create or revoke Bitbucket Server personal access tokens for CI pipelines",
    version
)]
/// Raw command line and environment. Required values stay optional here so
/// that [`crate::PatConfig::from_cli`] can report them with a dedicated exit code.
pub struct Cli {
    #[arg(value_enum, help = "Whether to create a new token or revoke an existing one")]
    pub mode: CliMode,

    #[arg(
        long = "project-permissions",
        default_value = "write",
        help = "Project permission level for the token: read, write or admin"
    )]
    pub project_permissions: String,

    #[arg(
        long = "repository-permissions",
        default_value = "write",
        help = "Repository permission level for the token: read, write or admin. Never weaker than the project level."
    )]
    pub repository_permissions: String,

    #[arg(
        long = "check-using-ldap-bind",
        default_value_t = false,
        action = ArgAction::Set,
        help = "Wait until an LDAP simple bind with the credentials succeeds on every configured host"
    )]
    pub check_using_ldap_bind: bool,

    #[arg(long, env = "username", help = "Stash and LDAP user name")]
    pub username: Option<String>,

    #[arg(
        long,
        env = "password",
        hide = true,
        hide_env_values = true,
        help = "Stash and LDAP password"
    )]
    pub password: Option<String>,

    #[arg(long = "base-url", env = "base_url", help = "Stash base URL")]
    pub base_url: Option<String>,

    #[arg(
        long = "pat-uri",
        env = "pat_uri",
        help = "Access-token REST resource below the base URL (default rest/access-tokens/1.0/users)"
    )]
    pub pat_uri: Option<String>,

    #[arg(
        long = "max-attempts",
        env = "max_attempts",
        help = "Attempts per retried operation (default 10)"
    )]
    pub max_attempts: Option<String>,

    #[arg(
        long = "seconds-between-attempts",
        env = "seconds_between_attempts",
        help = "Delay between attempts in seconds (default 30)"
    )]
    pub seconds_between_attempts: Option<String>,

    #[arg(
        long = "valid-days",
        env = "valid_days",
        help = "Token validity in days (default 1)"
    )]
    pub valid_days: Option<String>,

    #[arg(
        long = "request-timeout-seconds",
        env = "request_timeout_seconds",
        help = "Timeout for each individual HTTP request or LDAP operation (default 30)"
    )]
    pub request_timeout_seconds: Option<String>,

    #[arg(
        long = "pat-id",
        env = "pat_id",
        help = "Id of the token to revoke (revoke mode only)"
    )]
    pub pat_id: Option<String>,

    #[arg(
        long = "ldap-path",
        env = "ldap_path",
        help = "DN suffix appended to CN=<username> for the LDAP bind"
    )]
    pub ldap_path: Option<String>,

    #[arg(
        long = "ldap-hosts",
        env = "ldap_hosts",
        help = "Comma-separated LDAP hosts, checked in order"
    )]
    pub ldap_hosts: Option<String>,

    #[arg(
        long = "ldap-port",
        env = "ldap_port",
        help = "LDAP port (default 389)"
    )]
    pub ldap_port: Option<String>,

    #[arg(
        long = "github-repository",
        env = "GITHUB_REPOSITORY",
        hide = true,
        help = "Repository slug used to name the token"
    )]
    pub github_repository: Option<String>,

    #[arg(
        long = "github-output",
        env = "GITHUB_OUTPUT",
        hide = true,
        help = "File receiving step outputs"
    )]
    pub github_output: Option<PathBuf>,

    #[arg(
        long = "github-state",
        env = "GITHUB_STATE",
        hide = true,
        help = "File receiving saved state for the post step"
    )]
    pub github_state: Option<PathBuf>,
}
