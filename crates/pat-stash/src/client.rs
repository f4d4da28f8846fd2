use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use secrecy::ExposeSecret;

use pat_core::Credential;

use crate::StashError;

pub const DEFAULT_PAT_URI: &str = "rest/access-tokens/1.0/users";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const STASH_USER_AGENT: &str = "pat-helper";
const LOG_BODY_LIMIT: usize = 2_000;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Stash base URL plus the access-token REST resource beneath it.
pub struct StashEndpoint {
    base_url: String,
    pat_uri: String,
}

impl StashEndpoint {
    pub fn new(base_url: &str, pat_uri: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            pat_uri: pat_uri.trim().trim_start_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base_url}/{pat_uri}/{principal}`
    pub fn user_tokens_url(&self, principal: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            self.pat_uri,
            urlencoding::encode(principal)
        )
    }

    /// `{base_url}/{pat_uri}/{principal}/{token_id}`
    pub fn user_token_url(&self, principal: &str, token_id: &str) -> String {
        format!(
            "{}/{}",
            self.user_tokens_url(principal),
            urlencoding::encode(token_id)
        )
    }
}

#[derive(Debug, Clone)]
pub struct StashClient {
    http: Client,
    endpoint: StashEndpoint,
}

impl StashClient {
    /// Builds a blocking client whose every request is bounded by `request_timeout`.
    pub fn new(endpoint: StashEndpoint, request_timeout: Duration) -> Result<Self, StashError> {
        let http = Client::builder()
            .user_agent(STASH_USER_AGENT)
            .timeout(request_timeout)
            .build()
            .map_err(StashError::ClientSetup)?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &StashEndpoint {
        &self.endpoint
    }

    pub(crate) fn put(&self, url: &str, credential: &Credential) -> RequestBuilder {
        authenticated(self.http.put(url), credential)
    }

    pub(crate) fn delete(&self, url: &str, credential: &Credential) -> RequestBuilder {
        authenticated(self.http.delete(url), credential)
    }
}

fn authenticated(request: RequestBuilder, credential: &Credential) -> RequestBuilder {
    request.basic_auth(
        credential.principal(),
        Some(credential.secret().expose_secret()),
    )
}

/// Status, headers and (truncated) body of an unexpected response, for the operator log.
pub(crate) fn describe_unexpected_response(response: Response) -> String {
    let status = response.status();
    let headers = format!("{:?}", response.headers());
    let body = response.text().unwrap_or_default();
    format!(
        "status {}; headers {}; body {}",
        status.as_u16(),
        headers,
        truncate_for_log(&body, LOG_BODY_LIMIT)
    )
}

pub(crate) fn truncate_for_log(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated = text.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::{truncate_for_log, StashEndpoint, DEFAULT_PAT_URI};

    #[test]
    fn unit_endpoint_normalizes_slashes() {
        let endpoint = StashEndpoint::new("https://stash.example.com/", "/rest/access-tokens/1.0/users");
        assert_eq!(endpoint.base_url(), "https://stash.example.com");
        assert_eq!(
            endpoint.user_tokens_url("deploy-bot"),
            "https://stash.example.com/rest/access-tokens/1.0/users/deploy-bot"
        );
        assert_eq!(
            endpoint.user_token_url("deploy-bot", "42"),
            "https://stash.example.com/rest/access-tokens/1.0/users/deploy-bot/42"
        );
    }

    #[test]
    fn regression_path_segments_are_percent_encoded() {
        let endpoint = StashEndpoint::new("https://stash.example.com", DEFAULT_PAT_URI);
        assert_eq!(
            endpoint.user_tokens_url("svc user@corp"),
            "https://stash.example.com/rest/access-tokens/1.0/users/svc%20user%40corp"
        );
    }

    #[test]
    fn unit_truncate_for_log_bounds_long_bodies() {
        assert_eq!(truncate_for_log("short", 10), "short");
        assert_eq!(truncate_for_log("abcdef", 3), "abc...");
    }
}
