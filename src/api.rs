// API client module: a small blocking HTTP client that talks JSON to the
// document-processing service. Every call is one request; there are no
// retries and no timeouts beyond the transport defaults.

use crate::config::Config;
use crate::error::{MintError, Result};
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Simple API client that holds a reqwest blocking client and the base URL
/// of the service. Tokens are passed per call, never stored.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(ApiClient {
            client,
            base_url: config.base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request and decode the JSON answer.
    ///
    /// The body is read in full before the status is looked at so that error
    /// bodies can be mined for a service code and detail. A 2xx with an empty
    /// body decodes as `{}`.
    pub fn request<T, B>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut req = self
            .client
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(t) = token {
            req = req.header(AUTHORIZATION, format!("Bearer {}", t));
        }
        if let Some(b) = body {
            let payload = serde_json::to_vec(b).map_err(|e| {
                MintError::validation(format!("failed to serialize request body: {}", e))
            })?;
            req = req.body(payload);
        }

        debug!(%method, %url, "sending request");
        let res = req.send()?;
        let status = res.status();
        let text = res.text()?;
        debug!(%method, %url, status = status.as_u16(), bytes = text.len(), "received response");

        if !status.is_success() {
            return Err(MintError::from_response(status.as_u16(), &text));
        }

        let json = if text.trim().is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str(json).map_err(|e| {
            MintError::protocol("unexpected response from the server", Some(e.to_string()))
        })
    }

    pub fn get<T: DeserializeOwned>(&self, endpoint: &str, token: Option<&str>) -> Result<T> {
        self.request::<T, ()>(endpoint, Method::GET, None, token)
    }

    pub fn post<T, B>(&self, endpoint: &str, body: &B, token: Option<&str>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(endpoint, Method::POST, Some(body), token)
    }

    /// POST without a body.
    pub fn post_empty<T: DeserializeOwned>(&self, endpoint: &str, token: Option<&str>) -> Result<T> {
        self.request::<T, ()>(endpoint, Method::POST, None, token)
    }
}
