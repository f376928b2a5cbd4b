use reqwest::blocking::Client;
use reqwest::header;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("http status {0}")]
    Status(u16),
    #[error("unusable content type: {0}")]
    NotHtml(String),
}

/// Page retrieval boundary. The crawl loop only sees this trait, so a
/// test can run the controller against an in-memory site.
pub trait Fetch {
    fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Blocking HTTP fetcher: bounded wait, limited redirects, HTML only.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let resp = self.client.get(url.clone()).send()?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }
        if let Some(ct) = resp.headers().get(header::CONTENT_TYPE) {
            if let Ok(v) = ct.to_str() {
                if !v.starts_with("text/html") {
                    return Err(FetchError::NotHtml(v.to_string()));
                }
            }
        }
        Ok(resp.text()?)
    }
}
