//! Confluence REST API client.
//!
//! Provides sync HTTP client for the Confluence REST content API with basic
//! (username + API token) or bearer (personal access token) authentication.

mod attachments;
mod pages;

use std::time::Duration;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use ureq::http::Response;
use ureq::{Agent, Body};
use vaultpub_config::{ConfigError, ConfluenceConfig, Credentials};

use crate::error::ConfluenceError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Characters escaped in query string values.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Confluence REST API client bound to one space.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    space_key: String,
    auth_header: String,
}

impl ConfluenceClient {
    /// Create a client for `space_key` on the server at `base_url`.
    #[must_use]
    pub fn new(base_url: &str, space_key: &str, credentials: &Credentials) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            space_key: space_key.to_owned(),
            auth_header: authorization(credentials),
        }
    }

    /// Create client from the `[confluence]` config section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if no usable credentials are configured.
    pub fn from_config(config: &ConfluenceConfig) -> Result<Self, ConfigError> {
        let credentials = config.credentials()?;
        Ok(Self::new(&config.base_url, &config.space_key, &credentials))
    }

    /// Space the client publishes to.
    #[must_use]
    pub fn space_key(&self) -> &str {
        &self.space_key
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/rest/api", self.base_url)
    }
}

/// `Authorization` header value for the given credentials.
fn authorization(credentials: &Credentials) -> String {
    match credentials {
        Credentials::Basic {
            username,
            api_token,
        } => format!(
            "Basic {}",
            BASE64_STANDARD.encode(format!("{username}:{api_token}"))
        ),
        Credentials::Bearer(token) => format!("Bearer {token}"),
    }
}

/// Percent-encode a query string value.
fn encode_query(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Return the response body, or the error body for status >= 400.
fn checked_body(response: Response<Body>) -> Result<Body, ConfluenceError> {
    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_string());
        return Err(ConfluenceError::HttpResponse {
            status,
            body: error_body,
        });
    }

    Ok(body)
}
