//! HTTP implementation of the remote redirect service.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::model::Redirect;

use super::RemoteClient;

/// Client for the redirect REST API of one account/workspace.
pub struct HttpClient {
    client: reqwest::Client,
    base: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a client scoped to `account`/`workspace`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(
        endpoint: &str,
        token: Option<String>,
        account: &str,
        workspace: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("redsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Cannot build HTTP client: {e}")))?;

        let base = format!(
            "{}/v1/accounts/{account}/workspaces/{workspace}/redirects",
            endpoint.trim_end_matches('/')
        );

        Ok(Self { client, base, token })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<()> {
        let response = self
            .authorized(self.client.post(url).json(body))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            trace!(url, %status, "Remote call succeeded");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_status(status, &body))
    }
}

/// Request body for a batch import.
#[derive(Debug, Serialize)]
struct ImportRequest<'a> {
    redirects: &'a [Redirect],
}

/// Request body for a batch delete.
#[derive(Debug, Serialize)]
struct DeleteRequest<'a> {
    keys: &'a [&'a str],
}

/// One page of the redirect listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    redirects: Vec<ListedRedirect>,
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListedRedirect {
    from: String,
}

/// Structured error body returned by the API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Map a failed HTTP status to the engine's error taxonomy.
///
/// Request timeouts, rate limiting, and server errors are transient. Every
/// other failure is a rejection of the payload itself.
#[must_use]
pub fn classify_status(status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("no details").to_string()
            } else {
                trimmed.chars().take(500).collect()
            }
        });

    if status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
    {
        Error::RemoteTransient(format!("HTTP {}: {message}", status.as_u16()))
    } else {
        Error::RemoteRejection {
            status: status.as_u16(),
            message,
        }
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    Error::RemoteTransient(format!("request failed: {e}"))
}

impl RemoteClient for HttpClient {
    async fn import(&self, records: &[Redirect]) -> Result<()> {
        let url = format!("{}/import", self.base);
        debug!(count = records.len(), "Submitting import batch");
        self.post(&url, &ImportRequest { redirects: records }).await
    }

    async fn delete(&self, keys: &[&str]) -> Result<()> {
        let url = format!("{}/delete", self.base);
        debug!(count = keys.len(), "Submitting delete batch");
        self.post(&url, &DeleteRequest { keys }).await
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut request = self.client.get(&self.base);
            if let Some(cursor) = &cursor {
                request = request.query(&[("cursor", cursor)]);
            }

            let response = self
                .authorized(request)
                .send()
                .await
                .map_err(transport_error)?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(classify_status(status, &body));
            }

            let page: ListResponse = response
                .json()
                .await
                .map_err(|e| Error::RemoteTransient(format!("Malformed listing response: {e}")))?;

            keys.extend(page.redirects.into_iter().map(|r| r.from));

            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        debug!(count = keys.len(), "Listed remote redirects");
        Ok(keys)
    }
}
