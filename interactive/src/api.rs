use gloo_net::http::Request;
use ktap_feed::config::DEFAULT_API_BASE;
use ktap_feed::{FeedConfig, FeedError, Method, Result, Transport};
use ktap_shared::ErrorBody;
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::JsValue;
use web_sys::window;

const TOKEN_KEY: &str = "ktap_token";

fn api_base() -> String {
    // Read from a meta tag set by the host page, falling back to localhost for dev
    window()
        .and_then(|w| w.document())
        .and_then(|d| d.query_selector("meta[name='ktap-api']").ok().flatten())
        .and_then(|el| el.get_attribute("content"))
        .filter(|url| !url.is_empty())
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

pub fn config() -> FeedConfig {
    FeedConfig {
        api_base: api_base(),
        ..FeedConfig::default()
    }
}

pub fn get_token() -> Option<String> {
    window()?
        .local_storage()
        .ok()??
        .get_item(TOKEN_KEY)
        .ok()?
}

pub fn set_token(token: &str) {
    if let Some(storage) = window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
    {
        let _ = storage.set_item(TOKEN_KEY, token);
    }
}

pub fn clear_token() {
    if let Some(storage) = window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
    {
        let _ = storage.remove_item(TOKEN_KEY);
    }
}

/// The login page sends the user back here with `?token=...`. Keep the
/// token and take it out of the address bar.
pub fn take_login_token() -> Option<String> {
    let win = window()?;
    let url = web_sys::Url::new(&win.location().href().ok()?).ok()?;
    let params = url.search_params();
    let token = params.get("token").filter(|t| !t.is_empty())?;
    set_token(&token);

    params.delete("token");
    if let Ok(history) = win.history() {
        let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(&url.href()));
    }
    Some(token)
}

/// Path plus query of the page we are on, for coming back after login.
pub fn current_path() -> String {
    window()
        .map(|w| w.location())
        .and_then(|l| Some(format!("{}{}", l.pathname().ok()?, l.search().ok()?)))
        .unwrap_or_else(|| "/".to_string())
}

/// Full page navigation.
pub fn go_to(path: &str) {
    if let Some(w) = window() {
        let _ = w.location().set_href(path);
    }
}

/// Browser transport on gloo-net. The bearer token comes from local storage.
#[derive(Debug, Clone)]
pub struct GlooTransport {
    config: FeedConfig,
}

impl GlooTransport {
    pub fn new(config: FeedConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }
}

impl Transport for GlooTransport {
    async fn request<B, R>(&self, method: Method, path: &str, body: Option<&B>) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.config.url(path);
        let mut req = match method {
            Method::Get => Request::get(&url),
            Method::Post => Request::post(&url),
            Method::Put => Request::put(&url),
            Method::Delete => Request::delete(&url),
        };

        if let Some(token) = get_token() {
            req = req.header("Authorization", &format!("Bearer {}", token));
        }

        let signal = self.config.fetch_timeout.map(|t| {
            let ms = u32::try_from(t.as_millis()).unwrap_or(u32::MAX);
            web_sys::AbortSignal::timeout_with_u32(ms)
        });
        req = req.abort_signal(signal.as_ref());

        let sent = match body {
            Some(body) => {
                req.json(body)
                    .map_err(|e| FeedError::Decode(e.to_string()))?
                    .send()
                    .await
            }
            None => req.send().await,
        };
        let resp = sent.map_err(|e| FeedError::FetchFailed(e.to_string()))?;
        let text = resp
            .text()
            .await
            .map_err(|e| FeedError::FetchFailed(e.to_string()))?;

        if !resp.ok() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|b| b.message);
            return Err(FeedError::RequestRejected {
                status: resp.status(),
                message,
            });
        }

        let text = if text.is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| FeedError::Decode(e.to_string()))
    }
}
