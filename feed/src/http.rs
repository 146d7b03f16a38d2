use ktap_shared::ErrorBody;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::FeedConfig;
use crate::error::{FeedError, Result};
use crate::fetcher::{Method, Transport};
use crate::session::Session;

/// Native transport on reqwest.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    config: FeedConfig,
    session: Session,
}

impl HttpClient {
    pub fn new(config: FeedConfig, session: Session) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.fetch_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FeedError::Config(e.to_string()))?;
        Ok(Self {
            client,
            config,
            session,
        })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

impl Transport for HttpClient {
    async fn request<B, R>(&self, method: Method, path: &str, body: Option<&B>) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.config.url(path);
        let mut req = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        if let Some(token) = self.session.token() {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        debug!(method = method.as_str(), %url, "request");
        let resp = req
            .send()
            .await
            .map_err(|e| FeedError::FetchFailed(e.to_string()))?;
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| FeedError::FetchFailed(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|b| b.message);
            return Err(FeedError::RequestRejected {
                status: status.as_u16(),
                message,
            });
        }

        let bytes: &[u8] = if bytes.is_empty() { b"null" } else { &bytes[..] };
        serde_json::from_slice(bytes).map_err(|e| FeedError::Decode(e.to_string()))
    }
}
