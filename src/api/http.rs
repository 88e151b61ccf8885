use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Small JSON-over-HTTP client with a base URL and default headers.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct HttpClientBuilder {
    base_url: String,
    timeout: Duration,
    user_agent: String,
    headers: Vec<(String, String)>,
    cookie_store: bool,
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn cookie_store(mut self, enabled: bool) -> Self {
        self.cookie_store = enabled;
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .map_err(|e| Error::config(format!("invalid user agent: {}", e)))?,
        );
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::config(format!("invalid header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::config(format!("invalid header value: {}", e)))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .cookie_store(self.cookie_store)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(HttpClient {
            client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            timeout: self.timeout,
        })
    }
}

impl HttpClient {
    pub fn builder(base_url: impl Into<String>) -> HttpClientBuilder {
        HttpClientBuilder {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: Vec::new(),
            cookie_store: false,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URLs pass through; anything else is joined onto the base URL.
    pub fn build_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        if self.base_url.is_empty() {
            return endpoint.to_string();
        }
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Sends a GET and returns the response whatever its status.
    pub async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Response> {
        let url = self.build_url(endpoint);
        debug!(%url, ?params, "GET");
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| Error::external(format!("GET request failed for {}: {}", url, e)))?;
        Ok(response)
    }

    /// GET that requires a success status and decodes the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let response = self.get(endpoint, params).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::external(format!(
                "GET {} returned {}",
                self.build_url(endpoint),
                status
            )));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// GET returning the body as text, requiring a success status.
    pub async fn get_text(&self, endpoint: &str) -> Result<String> {
        let response = self.get(endpoint, &[]).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::external(format!(
                "GET {} returned {}",
                self.build_url(endpoint),
                status
            )));
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_joins_base_and_endpoint() {
        let client = HttpClient::builder("https://api.example.com/").build().unwrap();
        assert_eq!(client.build_url("users"), "https://api.example.com/users");
        assert_eq!(client.build_url("/users"), "https://api.example.com/users");
    }

    #[test]
    fn build_url_passes_absolute_urls_through() {
        let client = HttpClient::builder("https://api.example.com").build().unwrap();
        assert_eq!(
            client.build_url("https://other.example.com/x"),
            "https://other.example.com/x"
        );
    }

    #[test]
    fn build_url_without_base_returns_endpoint() {
        let client = HttpClient::builder("").build().unwrap();
        assert_eq!(client.build_url("/users"), "/users");
    }

    #[test]
    fn builder_defaults() {
        let client = HttpClient::builder("").build().unwrap();
        assert_eq!(client.base_url(), "");
        assert_eq!(client.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn builder_rejects_bad_header_name() {
        let err = HttpClient::builder("")
            .header("bad header", "x")
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
