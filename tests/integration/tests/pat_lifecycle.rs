use std::cell::RefCell;

use clap::Parser;
use httpmock::prelude::*;
use pat_cli::{execute, Cli, OutputTargets, PatConfig, RunError};
use pat_core::{ExitReason, ExposeSecret, RecordingSleeper, SecretString};
use pat_directory::{BindStatus, DirectoryBinder, DirectoryError};
use serde_json::json;

struct ScriptedDirectory {
    accepting_hosts: Vec<&'static str>,
    binds: RefCell<Vec<String>>,
}

impl ScriptedDirectory {
    fn accepting(hosts: &[&'static str]) -> Self {
        Self {
            accepting_hosts: hosts.to_vec(),
            binds: RefCell::new(Vec::new()),
        }
    }
}

impl DirectoryBinder for ScriptedDirectory {
    fn bind(
        &self,
        host: &str,
        bind_dn: &str,
        _password: &SecretString,
    ) -> Result<BindStatus, DirectoryError> {
        self.binds.borrow_mut().push(format!("{host}|{bind_dn}"));
        if self.accepting_hosts.contains(&host) {
            Ok(BindStatus::Bound)
        } else {
            Ok(BindStatus::Rejected {
                code: 49,
                message: "invalid credentials".to_string(),
            })
        }
    }
}

fn config(server: &MockServer, args: &[&str]) -> PatConfig {
    let base_url = server.base_url();
    let mut argv = vec![
        "pat-helper",
        "--username",
        "deploy-bot",
        "--password",
        "s3cret",
        "--base-url",
        base_url.as_str(),
        "--github-repository",
        "acme/widgets",
        "--max-attempts",
        "3",
        "--seconds-between-attempts",
        "1",
    ];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).expect("parse cli");
    let mut config = PatConfig::from_cli(&cli).expect("config");
    config.outputs = OutputTargets::default();
    config
}

fn stdout_lines(stdout: Vec<u8>) -> Vec<String> {
    String::from_utf8(stdout)
        .expect("utf8 stdout")
        .lines()
        .map(ToOwned::to_owned)
        .collect()
}

#[test]
fn integration_create_with_read_project_and_write_repository_emits_outputs() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(PUT)
            .path("/rest/access-tokens/1.0/users/deploy-bot")
            .json_body(json!({
                "name": "github-acme/widgets",
                "permissions": ["REPO_WRITE", "PROJECT_READ"],
                "expiryDays": 1
            }));
        then.status(200).json_body(json!({"token": "abc", "id": "7"}));
    });

    let config = config(
        &server,
        &[
            "create",
            "--project-permissions",
            "read",
            "--repository-permissions",
            "write",
        ],
    );
    let sleeper = RecordingSleeper::new();
    let directory = ScriptedDirectory::accepting(&[]);
    let mut stdout = Vec::new();
    let record = execute(&config, &directory, &sleeper, &mut stdout).expect("create succeeds");

    create.assert_calls(1);
    assert_eq!(record.id(), "7");
    assert_eq!(
        record.secret().map(|secret| secret.expose_secret()),
        Some("abc")
    );
    assert!(directory.binds.borrow().is_empty());
    assert!(sleeper.delays().is_empty());
    assert_eq!(
        stdout_lines(stdout),
        vec![
            "::add-mask::abc",
            "::add-mask::abc",
            "::set-output name=username::deploy-bot",
            "::set-output name=username_encoded::deploy-bot",
            "::set-output name=pat::abc",
            "::set-output name=pat_encoded::abc",
            "::set-output name=pat_id::7",
            "::save-state name=CLEANUP_PAT_ID::7",
        ]
    );
}

#[test]
fn integration_revoke_outputs_sentinel_instead_of_token() {
    let server = MockServer::start();
    let delete = server.mock(|when, then| {
        when.method(DELETE)
            .path("/rest/access-tokens/1.0/users/deploy-bot/42");
        then.status(204);
    });

    let config = config(&server, &["revoke", "--pat-id", "42"]);
    let sleeper = RecordingSleeper::new();
    let directory = ScriptedDirectory::accepting(&[]);
    let mut stdout = Vec::new();
    let record = execute(&config, &directory, &sleeper, &mut stdout).expect("revoke succeeds");

    delete.assert_calls(1);
    assert!(record.is_revoked());
    let lines = stdout_lines(stdout);
    assert!(lines.iter().all(|line| !line.starts_with("::add-mask::")));
    assert!(lines.contains(&"::set-output name=pat::revoked".to_string()));
    assert!(lines.contains(&"::set-output name=pat_id::42".to_string()));
}

#[test]
fn integration_ldap_check_runs_before_token_creation() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(PUT)
            .path("/rest/access-tokens/1.0/users/deploy-bot");
        then.status(200).json_body(json!({"token": "abc", "id": 7}));
    });

    let config = config(
        &server,
        &[
            "create",
            "--check-using-ldap-bind=true",
            "--ldap-path",
            "OU=Service,DC=corp",
            "--ldap-hosts",
            "dc1,dc2",
        ],
    );
    let sleeper = RecordingSleeper::new();
    let directory = ScriptedDirectory::accepting(&["dc1", "dc2"]);
    let mut stdout = Vec::new();
    let record = execute(&config, &directory, &sleeper, &mut stdout).expect("create succeeds");

    create.assert_calls(1);
    assert_eq!(record.id(), "7");
    assert_eq!(
        *directory.binds.borrow(),
        vec![
            "dc1|CN=deploy-bot,OU=Service,DC=corp".to_string(),
            "dc2|CN=deploy-bot,OU=Service,DC=corp".to_string(),
        ]
    );
}

#[test]
fn integration_ldap_exhaustion_aborts_before_contacting_stash() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(PUT)
            .path("/rest/access-tokens/1.0/users/deploy-bot");
        then.status(200).json_body(json!({"token": "abc", "id": "7"}));
    });

    let config = config(
        &server,
        &[
            "create",
            "--check-using-ldap-bind=true",
            "--ldap-path",
            "OU=Service,DC=corp",
            "--ldap-hosts",
            "dc1,dc2",
        ],
    );
    let sleeper = RecordingSleeper::new();
    let directory = ScriptedDirectory::accepting(&["dc2"]);
    let mut stdout = Vec::new();
    let error = execute(&config, &directory, &sleeper, &mut stdout).expect_err("ldap exhausted");

    assert!(matches!(error, RunError::Probe(_)));
    assert_eq!(error.exit_reason(), ExitReason::DirectoryBindExhausted);
    create.assert_calls(0);
    assert_eq!(directory.binds.borrow().len(), 3);
    assert!(directory
        .binds
        .borrow()
        .iter()
        .all(|bind| bind.starts_with("dc1|")));
    assert_eq!(sleeper.delays().len(), 2);
    assert!(stdout.is_empty());
}

#[test]
fn integration_missing_token_fails_without_outputs() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(PUT)
            .path("/rest/access-tokens/1.0/users/deploy-bot");
        then.status(200).json_body(json!({"id": "7"}));
    });

    let config = config(&server, &["create"]);
    let sleeper = RecordingSleeper::new();
    let directory = ScriptedDirectory::accepting(&[]);
    let mut stdout = Vec::new();
    let error = execute(&config, &directory, &sleeper, &mut stdout).expect_err("missing token");

    create.assert_calls(1);
    assert_eq!(error.exit_reason(), ExitReason::MissingToken);
    assert_eq!(error.exit_reason().code(), 31);
    assert!(stdout.is_empty());
}

#[test]
fn integration_output_files_are_used_when_configured() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(PUT)
            .path("/rest/access-tokens/1.0/users/deploy-bot");
        then.status(200).json_body(json!({"token": "abc", "id": "7"}));
    });

    let tempdir = tempfile::tempdir().expect("tempdir");
    let mut config = config(&server, &["create"]);
    config.outputs = OutputTargets {
        github_output: Some(tempdir.path().join("output")),
        github_state: Some(tempdir.path().join("state")),
    };
    let sleeper = RecordingSleeper::new();
    let directory = ScriptedDirectory::accepting(&[]);
    let mut stdout = Vec::new();
    execute(&config, &directory, &sleeper, &mut stdout).expect("create succeeds");

    let output = std::fs::read_to_string(tempdir.path().join("output")).expect("output file");
    assert!(output.contains("pat=abc\n"));
    assert!(output.contains("pat_id=7\n"));
    let state = std::fs::read_to_string(tempdir.path().join("state")).expect("state file");
    assert_eq!(state, "CLEANUP_PAT_ID=7\n");
}
