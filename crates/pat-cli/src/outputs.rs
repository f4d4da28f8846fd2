//! GitHub Actions output boundary.
//!
//! The only place where the token secret leaves its `SecretString`. Masks are
//! emitted before any value so the runner redacts the token from later log
//! lines. Outputs and state go to the `GITHUB_OUTPUT` / `GITHUB_STATE` files
//! when the runner provides them and fall back to the legacy `::set-output`
//! and `::save-state` commands otherwise.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pat_core::ExposeSecret;
use pat_stash::TokenRecord;

pub const CLEANUP_STATE_NAME: &str = "CLEANUP_PAT_ID";
const MULTILINE_DELIMITER: &str = "PAT_HELPER_EOF";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTargets {
    pub github_output: Option<PathBuf>,
    pub github_state: Option<PathBuf>,
}

/// Percent-encodes every byte outside `A-Z a-z 0-9 - _ . ~`.
pub fn url_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

pub fn publish_outputs<W: Write>(
    stdout: &mut W,
    targets: &OutputTargets,
    username: &str,
    record: &TokenRecord,
) -> Result<()> {
    let token = record
        .secret()
        .map(|secret| secret.expose_secret())
        .unwrap_or_default();
    let token_encoded = url_encode(token);

    if !record.is_revoked() && !token.is_empty() {
        writeln!(stdout, "::add-mask::{token}").context("failed to write token mask")?;
        writeln!(stdout, "::add-mask::{token_encoded}")
            .context("failed to write encoded token mask")?;
    }

    let outputs = [
        ("username", username.to_string()),
        ("username_encoded", url_encode(username)),
        ("pat", token.to_string()),
        ("pat_encoded", token_encoded),
        ("pat_id", record.id().to_string()),
    ];
    for (name, value) in &outputs {
        match targets.github_output.as_deref() {
            Some(path) => append_key_value(path, name, value)?,
            None => writeln!(stdout, "::set-output name={name}::{value}")
                .with_context(|| format!("failed to write output {name}"))?,
        }
    }

    // Read by the post step to revoke the token automatically.
    match targets.github_state.as_deref() {
        Some(path) => append_key_value(path, CLEANUP_STATE_NAME, record.id())?,
        None => writeln!(
            stdout,
            "::save-state name={CLEANUP_STATE_NAME}::{}",
            record.id()
        )
        .context("failed to write cleanup state")?,
    }
    stdout.flush().context("failed to flush workflow commands")
}

fn append_key_value(path: &Path, name: &str, value: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let entry = if value.contains('\n') {
        format!("{name}<<{MULTILINE_DELIMITER}\n{value}\n{MULTILINE_DELIMITER}\n")
    } else {
        format!("{name}={value}\n")
    };
    file.write_all(entry.as_bytes())
        .with_context(|| format!("failed to append {name} to {}", path.display()))
}
