//! org::rest
//!
//! Salesforce REST API implementation of [`OrgApi`].
//!
//! # Design
//!
//! All three operations are plain `GET`s under
//! `{instance_url}/services/data/v{api_version}/`:
//! - `query?q=<soql>`, following `nextRecordsUrl` until `done`
//! - `sobjects`
//! - `limits`
//!
//! Requests carry a bearer access token. Tokens are never refreshed here;
//! a rejected token surfaces as `OrgError::AuthFailed` and the user is
//! expected to run `wry auth` again.
//!
//! # Example
//!
//! ```ignore
//! use sfwry::org::{OrgApi, RestOrg};
//!
//! let org = RestOrg::new("https://example.my.salesforce.com", token)
//!     .with_api_version("60.0");
//! let limits = org.limits().await?;
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use super::traits::{Limits, OrgApi, OrgError, SObjectSummary};

/// API version used when neither the org nor the global config names one.
pub const DEFAULT_API_VERSION: &str = "59.0";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "wry-cli";

/// REST client bound to one org.
pub struct RestOrg {
    client: Client,
    /// Base URL of the org, without trailing slash
    instance_url: String,
    access_token: String,
    api_version: String,
}

// Custom Debug to avoid exposing the access token
impl std::fmt::Debug for RestOrg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestOrg")
            .field("instance_url", &self.instance_url)
            .field("api_version", &self.api_version)
            .field("has_token", &!self.access_token.is_empty())
            .finish()
    }
}

/// One page of a query result.
#[derive(Debug, Deserialize)]
struct QueryPage {
    #[serde(default)]
    done: bool,
    #[serde(rename = "nextRecordsUrl")]
    next_records_url: Option<String>,
    #[serde(default)]
    records: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DescribeGlobalResponse {
    sobjects: Vec<SObjectSummary>,
}

/// Salesforce error bodies are arrays of these.
#[derive(Debug, Deserialize)]
struct SalesforceError {
    message: String,
    #[serde(rename = "errorCode")]
    error_code: Option<String>,
}

impl RestOrg {
    /// Create a client for the org at `instance_url` using the default API version.
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        let instance_url: String = instance_url.into();
        Self {
            client: Client::new(),
            instance_url: instance_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Use a specific API version (e.g. `"60.0"`).
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Get the instance URL.
    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    /// Get the API version.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Build URL for a data API resource.
    fn data_url(&self, resource: &str) -> String {
        format!(
            "{}/services/data/v{}/{}",
            self.instance_url, self.api_version, resource
        )
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, OrgError> {
        if self.access_token.is_empty() {
            return Err(OrgError::AuthRequired);
        }
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.access_token))
            .map_err(|_| OrgError::AuthFailed("access token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        Ok(headers)
    }

    /// Issue a GET and decode the JSON body.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, OrgError> {
        tracing::debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .headers(self.headers()?)
            .query(query)
            .send()
            .await
            .map_err(|e| OrgError::NetworkError(e.to_string()))?;
        self.handle_response(response).await
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
    ) -> Result<T, OrgError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| OrgError::Decode(format!("failed to parse response: {}", e)))
        } else {
            Err(Self::error_from_response(response, status).await)
        }
    }

    /// Map an error response to an `OrgError`.
    async fn error_from_response(response: Response, status: StatusCode) -> OrgError {
        let message = match response.json::<Vec<SalesforceError>>().await {
            Ok(errors) if !errors.is_empty() => errors
                .into_iter()
                .map(|e| match e.error_code {
                    Some(code) => format!("{}: {}", code, e.message),
                    None => e.message,
                })
                .collect::<Vec<_>>()
                .join("; "),
            _ => "Unknown error".to_string(),
        };

        match status {
            StatusCode::UNAUTHORIZED => OrgError::AuthFailed(message),
            StatusCode::FORBIDDEN => OrgError::AuthFailed(format!("Permission denied: {}", message)),
            StatusCode::NOT_FOUND => OrgError::NotFound(message),
            _ if status.is_server_error() => OrgError::ApiError {
                status: status.as_u16(),
                message: format!("Salesforce server error: {}", message),
            },
            _ => OrgError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl OrgApi for RestOrg {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn query(&self, soql: &str) -> Result<Vec<serde_json::Value>, OrgError> {
        let mut page: QueryPage = self.get_json(&self.data_url("query"), &[("q", soql)]).await?;
        let mut records = std::mem::take(&mut page.records);

        while !page.done {
            let Some(next) = page.next_records_url.take() else {
                break;
            };
            let url = format!("{}{}", self.instance_url, next);
            page = self.get_json(&url, &[]).await?;
            records.append(&mut page.records);
        }

        tracing::debug!(soql, rows = records.len(), "query complete");
        Ok(records)
    }

    async fn describe_global(&self) -> Result<Vec<SObjectSummary>, OrgError> {
        let response: DescribeGlobalResponse =
            self.get_json(&self.data_url("sobjects"), &[]).await?;
        Ok(response.sobjects)
    }

    async fn limits(&self) -> Result<Limits, OrgError> {
        self.get_json(&self.data_url("limits"), &[]).await
    }
}
