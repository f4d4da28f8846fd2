use pat_core::{
    Credential, ExitReason, OperationOutcome, PermissionGrant, RetryPolicy, SecretString, Sleeper,
};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::client::describe_unexpected_response;
use crate::{StashClient, StashError, TokenRecord};

pub const LOCAL_TOKEN_NAME: &str = "local-test";

/// Token name shown in the Stash UI: `github-{owner/repo}` inside a workflow run.
pub fn token_name(github_repository: Option<&str>) -> String {
    match github_repository.map(str::trim).filter(|repo| !repo.is_empty()) {
        Some(repository) => format!("github-{repository}"),
        None => LOCAL_TOKEN_NAME.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    pub name: String,
    pub grant: PermissionGrant,
    pub validity_days: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTokenPayload<'a> {
    name: &'a str,
    permissions: &'a PermissionGrant,
    expiry_days: u32,
}

pub struct TokenIssuer<'a> {
    client: &'a StashClient,
}

impl<'a> TokenIssuer<'a> {
    pub fn new(client: &'a StashClient) -> Self {
        Self { client }
    }

    /// Creates a token for `credential`'s principal, retrying while Stash
    /// still rejects the credential with `401`.
    pub fn issue<S: Sleeper>(
        &self,
        credential: &Credential,
        request: &IssueRequest,
        policy: &RetryPolicy<S>,
    ) -> Result<TokenRecord, StashError> {
        let principal = credential.principal();
        let url = self.client.endpoint().user_tokens_url(principal);
        let payload = CreateTokenPayload {
            name: &request.name,
            permissions: &request.grant,
            expiry_days: request.validity_days,
        };

        let body = policy.execute("create personal access token", |_| {
            self.attempt_create(&url, credential, &payload)
        })?;
        let record = decode_issued_token(&body, principal)?;
        info!(
            pat_id = record.id(),
            principal, "stash has issued PAT ID {} for user {principal}", record.id()
        );
        Ok(record)
    }

    fn attempt_create(
        &self,
        url: &str,
        credential: &Credential,
        payload: &CreateTokenPayload<'_>,
    ) -> OperationOutcome<String> {
        let response = match self.client.put(url, credential).json(payload).send() {
            Ok(response) => response,
            Err(error) => {
                return OperationOutcome::TransientFailure(format!(
                    "request to {} failed: {error}",
                    self.client.endpoint().base_url()
                ))
            }
        };

        match response.status() {
            StatusCode::OK => match response.text() {
                Ok(body) => OperationOutcome::Success(body),
                Err(error) => OperationOutcome::PermanentFailure(
                    format!("failed to read stash response body: {error}"),
                    ExitReason::UndecodableBody,
                ),
            },
            StatusCode::UNAUTHORIZED => OperationOutcome::TransientFailure(format!(
                "password for user {} not (yet) valid with {}",
                credential.principal(),
                self.client.endpoint().base_url()
            )),
            _ => OperationOutcome::PermanentFailure(
                format!(
                    "stash returned a status that was not 200 or 401: {}",
                    describe_unexpected_response(response)
                ),
                ExitReason::IssueUnexpectedStatus,
            ),
        }
    }
}

/// Extracts `token` and `id` from a successful create response.
fn decode_issued_token(body: &str, owner_principal: &str) -> Result<TokenRecord, StashError> {
    let payload = serde_json::from_str::<Value>(body).map_err(StashError::UndecodableBody)?;
    let token = payload
        .get("token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .ok_or(StashError::MissingToken)?;
    let id = match payload.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
        Some(Value::Number(id)) if id.as_f64() != Some(0.0) => id.to_string(),
        _ => return Err(StashError::MissingId),
    };
    Ok(TokenRecord::issued(
        id,
        SecretString::from(token.to_string()),
        owner_principal,
    ))
}
