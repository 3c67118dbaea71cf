use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use scraper::{Html, Selector};
use url::Url;

use crate::domain::Doi;
use crate::error::{FailureKind, PaperError};

pub const DEFAULT_MIRROR_BASE: &str = "https://sci-hub.se";

// Everything the mirror's result pages look like is confined to this
// module: the not-found marker, the title prefix and the element ids.
const NOT_FOUND_MARKER: &str = "article not found";
const TITLE_PREFIX: &str = "Sci-Hub | ";
const DOWNLOAD_ROUTE_PREFIX: &str = "/download";

/// Outcome of a successful lookup: where to download the document, plus
/// the display title scraped from the result page (diagnostics only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDocument {
    pub title: Option<String>,
    pub download_url: String,
}

pub trait MirrorClient: Send + Sync {
    fn resolve(&self, doi: &Doi) -> Result<ResolvedDocument, FailureKind>;
    fn download(&self, url: &str) -> Result<Vec<u8>, FailureKind>;
}

#[derive(Debug, Clone)]
pub struct MirrorHttpClient {
    client: Client,
    base: Url,
}

impl MirrorHttpClient {
    pub fn new(base: &str) -> Result<Self, PaperError> {
        let base = Url::parse(base)
            .map_err(|err| PaperError::MirrorHttp(format!("invalid mirror base {base}: {err}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("paperfetch/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| PaperError::MirrorHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| PaperError::MirrorHttp(err.to_string()))?;
        Ok(Self { client, base })
    }

    fn lookup_url(&self, doi: &Doi) -> String {
        format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            doi.as_str()
        )
    }
}

impl MirrorClient for MirrorHttpClient {
    fn resolve(&self, doi: &Doi) -> Result<ResolvedDocument, FailureKind> {
        let url = self.lookup_url(doi);
        tracing::debug!(%url, "querying mirror");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| FailureKind::Transport(err.to_string()))?;
        if !response.status().is_success() {
            return Err(FailureKind::Status(response.status().as_u16()));
        }
        let body = response
            .text()
            .map_err(|err| FailureKind::Transport(err.to_string()))?;
        scrape_result_page(&body, &self.base)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, FailureKind> {
        tracing::debug!(%url, "downloading document");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| FailureKind::Transport(err.to_string()))?;
        if !response.status().is_success() {
            return Err(FailureKind::Status(response.status().as_u16()));
        }
        let payload = response
            .bytes()
            .map_err(|err| FailureKind::Transport(err.to_string()))?;
        Ok(payload.to_vec())
    }
}

/// Scrapes a mirror result page. The not-found marker in the page title is
/// checked before any link extraction; it is the service's explicit signal
/// that the identifier has no mirrored document.
pub fn scrape_result_page(html: &str, base: &Url) -> Result<ResolvedDocument, FailureKind> {
    let document = Html::parse_document(html);

    let title_selector = Selector::parse("title").unwrap();
    let title_text = document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>())
        .ok_or_else(|| FailureKind::Parse("result page has no title".to_string()))?;

    if title_text.contains(NOT_FOUND_MARKER) {
        return Err(FailureKind::NotFound);
    }

    let display_title = title_text
        .strip_prefix(TITLE_PREFIX)
        .map(|rest| rest.trim().to_string());

    let pdf_selector = Selector::parse("#article #pdf").unwrap();
    let element = document
        .select(&pdf_selector)
        .next()
        .ok_or_else(|| FailureKind::Parse("no #pdf element under #article".to_string()))?;
    let src = element
        .value()
        .attr("src")
        .ok_or_else(|| FailureKind::Parse("#pdf element has no src attribute".to_string()))?;
    let src = src.split('#').next().unwrap_or(src);

    let download_url = normalize_link(src, base)?;
    Ok(ResolvedDocument {
        title: display_title,
        download_url,
    })
}

/// Normalizes the scraped source location into an absolute URL. Anything
/// that is neither root-relative under the download route nor
/// protocol-relative is an explicit failure, never a guessed default.
pub fn normalize_link(link: &str, base: &Url) -> Result<String, FailureKind> {
    if link.starts_with("//") {
        return Ok(format!("{}:{}", base.scheme(), link));
    }
    if link.starts_with(DOWNLOAD_ROUTE_PREFIX) {
        let host = base
            .host_str()
            .ok_or_else(|| FailureKind::UnresolvedLink(link.to_string()))?;
        return Ok(format!("{}://{}{}", base.scheme(), host, link));
    }
    Err(FailureKind::UnresolvedLink(link.to_string()))
}
