//! Page fetching and HTML-to-text conversion for the competitor miner.

use std::time::Duration;

use crate::types::{AdmixError, AdmixResult};

/// Default per-request timeout for competitor page fetches.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Browser user-agent sent with page fetches; many marketing sites serve an
/// empty shell to obvious bot agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Outcome of fetching a single page.
///
/// `Unavailable` is a deliberate degradation, not an error: a competitor
/// page we cannot read simply contributes nothing to the signal. Keeping it
/// an explicit variant makes that policy visible at the call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageText {
    Text(String),
    Unavailable,
}

impl PageText {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, PageText::Unavailable)
    }
}

/// Source of page text for the miner. Stubbed in tests.
pub trait PageFetcher {
    fn fetch_text(&self, url: &str) -> PageText;
}

/// Blocking HTTP fetcher with a fixed per-request timeout.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> AdmixResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AdmixError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch_text(&self, url: &str) -> PageText {
        match self.client.get(url).send() {
            Ok(resp) if resp.status().is_success() => match resp.text() {
                Ok(body) => PageText::Text(strip_html(&body)),
                Err(e) => {
                    tracing::debug!(url, error = %e, "failed to read response body");
                    PageText::Unavailable
                }
            },
            Ok(resp) => {
                tracing::debug!(url, status = %resp.status(), "non-success status");
                PageText::Unavailable
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "fetch failed");
                PageText::Unavailable
            }
        }
    }
}

/// Strip markup down to visible text.
///
/// Single-pass tag stripper: drops `<script>` and `<style>` bodies, removes
/// tags, decodes a handful of common entities, and collapses whitespace.
/// Heuristic by design; good enough for frequency counting.
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 4);
    let mut prev_space = true;
    let mut in_tag = false;
    let mut tag = String::new();
    let mut skip_block: Option<&'static str> = None;

    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                tag.clear();
            }
            '>' if in_tag => {
                in_tag = false;
                let closing = tag.starts_with('/');
                let name: String = tag
                    .trim_start_matches('/')
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_ascii_lowercase();
                match skip_block {
                    Some(block) if closing && name == block => skip_block = None,
                    None if !closing && name == "script" => skip_block = Some("script"),
                    None if !closing && name == "style" => skip_block = Some("style"),
                    _ => {}
                }
                if !prev_space {
                    out.push(' ');
                    prev_space = true;
                }
            }
            _ if in_tag => tag.push(ch),
            _ if skip_block.is_some() => {}
            _ => {
                if ch.is_whitespace() {
                    if !prev_space {
                        out.push(' ');
                        prev_space = true;
                    }
                } else {
                    out.push(ch);
                    prev_space = false;
                }
            }
        }
    }

    decode_entities(out.trim())
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}
