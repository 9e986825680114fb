use crate::config::FetchSettings;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, warn};

/// Page retrieval seam. Strategies only ever see this trait, so tests can
/// substitute canned documents for the live HTTP client.
pub trait PageFetcher {
    /// Best-effort single-shot GET. Returns the body when the response is a
    /// usable HTML document, `None` for anything else. Never panics or
    /// propagates transport errors; a missed page just means a missed
    /// district in the aggregate roster.
    fn fetch(&self, url: &str) -> Option<String>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Option<String> {
        let resp = match self.client.get(url).send() {
            Ok(resp) => resp,
            Err(err) => {
                warn!(%url, error = %err, "request failed");
                return None;
            }
        };

        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase);

        if !is_usable(status.as_u16(), content_type.as_deref()) {
            warn!(
                %url,
                %status,
                content_type = content_type.as_deref().unwrap_or("<missing>"),
                "response is not a usable html document"
            );
            return None;
        }

        match resp.text() {
            Ok(body) => {
                debug!(%url, bytes = body.len(), "fetched page");
                Some(body)
            }
            Err(err) => {
                warn!(%url, error = %err, "failed to read response body");
                None
            }
        }
    }
}

// Usable means status 200 and a Content-Type that names some flavor of
// HTML or XML. Redirect statuses the client already followed; anything
// else is treated as no data.
pub fn is_usable(status: u16, content_type: Option<&str>) -> bool {
    status == 200 && content_type.is_some_and(|ct| ct.contains("html") || ct.contains("xml"))
}
