use std::net::Ipv4Addr;
use std::time::Duration;

use reqwest::StatusCode;

use super::{parse_addr, Lookup, DEFAULT_TIMEOUT};
use crate::error::AttemptError;

/// Plain-text "what is my ip" web service.
#[derive(Debug, Clone)]
pub struct HttpLookup {
    url: String,
    timeout: Duration,
}

impl HttpLookup {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_error(&self, source: reqwest::Error) -> AttemptError {
        AttemptError::Http {
            url: self.url.clone(),
            source,
        }
    }
}

#[async_trait::async_trait]
impl Lookup for HttpLookup {
    async fn lookup(&self) -> Result<Ipv4Addr, AttemptError> {
        tracing::debug!(url = %self.url, "www lookup");

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("natip/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| self.request_error(e))?;

        let response = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AttemptError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.request_error(e))?;
        if !body.is_ascii() {
            return Err(AttemptError::malformed(
                String::from_utf8_lossy(&body),
                "non-ascii response body",
            ));
        }
        parse_addr(&String::from_utf8_lossy(&body))
    }
}
