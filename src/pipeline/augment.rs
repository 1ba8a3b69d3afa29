//! Web augmentation for thin specification blocks.
//!
//! When the model could not read enough specifications off the image, the
//! product name is searched on the web and matching result snippets are
//! appended to the catalog entry. The lookup is best-effort: every failure is
//! captured as an [`AugmentError`] inside [`Augmentation::Looked`] and only
//! rendered to text at the boundary ([`Augmentation::web_info`]). Nothing in
//! this module returns an error to the catalog builder.

use crate::config::CatalogConfig;
use crate::error::{AugmentError, CatalogError};
use crate::prompts::{LOOKUP_FAILED_PREFIX, NO_SPECS_FOUND};
use async_trait::async_trait;
use reqwest::Url;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Number of leading product-name characters a snippet must contain.
const NAME_PREFIX_CHARS: usize = 5;

/// Fetches a search results page for a query.
#[async_trait]
pub trait SearchSource: Send + Sync {
    /// Return the result page markup for `query`.
    async fn fetch(&self, query: &str) -> Result<String, AugmentError>;
}

/// [`SearchSource`] that queries `<base>/search?q=…` over HTTP.
#[derive(Debug, Clone)]
pub struct WebSearch {
    client: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl WebSearch {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let base_url = Url::parse(&config.search_base_url).map_err(|e| {
            CatalogError::InvalidConfig(format!(
                "search_base_url '{}' is not a valid URL: {}",
                config.search_base_url, e
            ))
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.search_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| CatalogError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            timeout_secs: config.search_timeout_secs,
        })
    }

    /// The URL requested for `query`.
    pub fn search_url(&self, query: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("/search");
        url.query_pairs_mut().clear().append_pair("q", query);
        url
    }
}

#[async_trait]
impl SearchSource for WebSearch {
    async fn fetch(&self, query: &str) -> Result<String, AugmentError> {
        let url = self.search_url(query);
        debug!("Searching: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AugmentError::Timeout {
                    secs: self.timeout_secs,
                }
            } else {
                AugmentError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Search answered HTTP {}, reading the page anyway", status.as_u16());
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                AugmentError::Timeout {
                    secs: self.timeout_secs,
                }
            } else {
                AugmentError::Transport(e.to_string())
            }
        })
    }
}

/// Whether a specifications block is too thin to stand on its own.
///
/// True when the block is empty, has fewer than `min_lines` lines, or any line
/// contains `marker`.
pub fn needs_augmentation(specs: &str, min_lines: usize, marker: &str) -> bool {
    specs.is_empty() || specs.lines().count() < min_lines || specs.lines().any(|l| l.contains(marker))
}

/// Pull snippets mentioning the product out of a results page.
///
/// A snippet's text is its text nodes trimmed and concatenated. It is kept
/// when its lower-cased text contains the first five characters of the
/// lower-cased product name. At most `max` snippets are returned.
pub fn extract_snippets(
    html: &str,
    selector: &str,
    product_name: &str,
    max: usize,
) -> Result<Vec<String>, AugmentError> {
    let selector = Selector::parse(selector).map_err(|e| AugmentError::Selector {
        selector: selector.to_string(),
        detail: e.to_string(),
    })?;
    let prefix: String = product_name
        .to_lowercase()
        .chars()
        .take(NAME_PREFIX_CHARS)
        .collect();

    let document = Html::parse_document(html);
    let snippets = document
        .select(&selector)
        .map(|el| {
            el.text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<String>()
        })
        .filter(|text| text.to_lowercase().contains(&prefix))
        .take(max)
        .collect();

    Ok(snippets)
}

/// Outcome of the augmentation step for one product.
#[derive(Debug, Clone, PartialEq)]
pub enum Augmentation {
    /// The specifications were complete enough, or search is disabled.
    NotNeeded,
    /// A lookup ran; `Ok` holds the matching snippets (possibly none).
    Looked(Result<Vec<String>, AugmentError>),
}

impl Augmentation {
    /// Text for the record's `web_scraped_info` and the appended section.
    ///
    /// `None` when no lookup ran.
    pub fn web_info(&self) -> Option<String> {
        match self {
            Augmentation::NotNeeded => None,
            Augmentation::Looked(Ok(snippets)) if snippets.is_empty() => {
                Some(NO_SPECS_FOUND.to_string())
            }
            Augmentation::Looked(Ok(snippets)) => Some(
                snippets
                    .iter()
                    .map(|s| format!("- {s}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            Augmentation::Looked(Err(e)) => Some(format!("{LOOKUP_FAILED_PREFIX}: {e}")),
        }
    }
}

/// Decides whether to look up specifications and performs the lookup.
#[derive(Clone)]
pub struct SpecAugmenter {
    source: Option<Arc<dyn SearchSource>>,
    selector: String,
    max_snippets: usize,
    min_spec_lines: usize,
    marker: String,
}

impl SpecAugmenter {
    /// `source = None` disables lookups entirely.
    pub fn new(source: Option<Arc<dyn SearchSource>>, config: &CatalogConfig) -> Self {
        Self {
            source,
            selector: config.snippet_selector.clone(),
            max_snippets: config.max_snippets,
            min_spec_lines: config.min_spec_lines,
            marker: config.missing_info_marker.clone(),
        }
    }

    pub async fn augment(&self, product_name: &str, specs: &str) -> Augmentation {
        let Some(source) = self.source.as_ref() else {
            return Augmentation::NotNeeded;
        };
        if !needs_augmentation(specs, self.min_spec_lines, &self.marker) {
            return Augmentation::NotNeeded;
        }

        let query = format!("{product_name} specifications");
        info!("Specifications look thin, searching: {}", query);

        let outcome = match source.fetch(&query).await {
            Ok(html) => extract_snippets(&html, &self.selector, product_name, self.max_snippets),
            Err(e) => Err(e),
        };
        match &outcome {
            Ok(snippets) => debug!("Web lookup found {} snippets", snippets.len()),
            Err(e) => warn!("Web lookup failed — {}", e),
        }
        Augmentation::Looked(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SNIPPET_SELECTOR;

    const MARKER: &str = "Requires further information";

    struct FailingSource;

    #[async_trait]
    impl SearchSource for FailingSource {
        async fn fetch(&self, _query: &str) -> Result<String, AugmentError> {
            Err(AugmentError::Transport("connection refused".into()))
        }
    }

    struct StaticSource(&'static str);

    #[async_trait]
    impl SearchSource for StaticSource {
        async fn fetch(&self, _query: &str) -> Result<String, AugmentError> {
            Ok(self.0.to_string())
        }
    }

    const RESULTS_PAGE: &str = r#"<html><body>
        <div class="BNeawe s3v9rd AP7Wnd"> Acme Rocket 3000 weighs <b>2 kg</b> </div>
        <div class="BNeawe s3v9rd AP7Wnd">Unrelated result about kettles</div>
        <div class="BNeawe s3v9rd AP7Wnd">ACME ROCKET has a 40 min battery</div>
        <div class="other">Acme in the wrong element</div>
    </body></html>"#;

    #[test]
    fn thin_when_empty() {
        assert!(needs_augmentation("", 5, MARKER));
    }

    #[test]
    fn thin_when_fewer_than_five_lines() {
        let specs = "- Weight: 2 kg\n- Colour: red\n- Size: M\n- Power: 5 W";
        assert!(needs_augmentation(specs, 5, MARKER));
    }

    #[test]
    fn thin_when_marker_present() {
        let specs = "- a: 1\n- b: 2\n- c: 3\n- d: Requires further information\n- e: 5";
        assert!(needs_augmentation(specs, 5, MARKER));
    }

    #[test]
    fn five_clean_lines_are_enough() {
        let specs = "- a: 1\n- b: 2\n- c: 3\n- d: 4\n- e: 5";
        assert!(!needs_augmentation(specs, 5, MARKER));
    }

    #[test]
    fn snippets_filtered_by_name_prefix() {
        let snippets =
            extract_snippets(RESULTS_PAGE, DEFAULT_SNIPPET_SELECTOR, "Acme Rocket 3000", 5).unwrap();
        assert_eq!(
            snippets,
            vec![
                "Acme Rocket 3000 weighs2 kg".to_string(),
                "ACME ROCKET has a 40 min battery".to_string()
            ]
        );
    }

    #[test]
    fn snippets_capped() {
        let snippets =
            extract_snippets(RESULTS_PAGE, DEFAULT_SNIPPET_SELECTOR, "Acme Rocket", 1).unwrap();
        assert_eq!(snippets.len(), 1);
    }

    #[test]
    fn selector_not_found_is_empty() {
        let snippets =
            extract_snippets("<html></html>", DEFAULT_SNIPPET_SELECTOR, "Acme", 5).unwrap();
        assert!(snippets.is_empty());
    }

    #[test]
    fn invalid_selector_is_error() {
        let err = extract_snippets(RESULTS_PAGE, "div[", "Acme", 5).unwrap_err();
        assert!(matches!(err, AugmentError::Selector { .. }));
    }

    #[test]
    fn web_info_rendering() {
        assert_eq!(Augmentation::NotNeeded.web_info(), None);
        assert_eq!(
            Augmentation::Looked(Ok(vec![])).web_info().unwrap(),
            "No detailed specs found online."
        );
        assert_eq!(
            Augmentation::Looked(Ok(vec!["a".into(), "b".into()]))
                .web_info()
                .unwrap(),
            "- a\n- b"
        );
    }

    #[tokio::test]
    async fn transport_failure_is_captured() {
        let augmenter = SpecAugmenter::new(Some(Arc::new(FailingSource)), &CatalogConfig::default());
        let outcome = augmenter.augment("Acme", "").await;

        assert_eq!(
            outcome,
            Augmentation::Looked(Err(AugmentError::Transport("connection refused".into())))
        );
        let text = outcome.web_info().unwrap();
        assert!(text.starts_with("Web scraping failed: "), "got: {text}");
        assert!(text.contains("connection refused"));
    }

    #[tokio::test]
    async fn complete_specs_skip_lookup() {
        let augmenter = SpecAugmenter::new(Some(Arc::new(FailingSource)), &CatalogConfig::default());
        let specs = "- a: 1\n- b: 2\n- c: 3\n- d: 4\n- e: 5";
        assert_eq!(augmenter.augment("Acme", specs).await, Augmentation::NotNeeded);
    }

    #[tokio::test]
    async fn disabled_search_skips_lookup() {
        let augmenter = SpecAugmenter::new(None, &CatalogConfig::default());
        assert_eq!(augmenter.augment("Acme", "").await, Augmentation::NotNeeded);
    }

    #[tokio::test]
    async fn lookup_returns_matching_snippets() {
        let augmenter =
            SpecAugmenter::new(Some(Arc::new(StaticSource(RESULTS_PAGE))), &CatalogConfig::default());
        let outcome = augmenter.augment("Acme Rocket 3000", "- one line").await;
        let info = outcome.web_info().unwrap();
        assert_eq!(info, "- Acme Rocket 3000 weighs2 kg\n- ACME ROCKET has a 40 min battery");
    }

    #[tokio::test]
    async fn error_status_page_is_still_parsed() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await.unwrap();
            let body = r#"<div class="BNeawe s3v9rd AP7Wnd">Acme Rocket weighs 2 kg</div>"#;
            let reply = format!(
                "HTTP/1.1 429 Too Many Requests\r\n\
                 Content-Type: text/html\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        let config = CatalogConfig::builder()
            .search_base_url(format!("http://{addr}"))
            .build()
            .unwrap();
        let search = WebSearch::new(&config).unwrap();
        let augmenter = SpecAugmenter::new(Some(Arc::new(search)), &config);

        let outcome = augmenter.augment("Acme Rocket", "").await;
        assert_eq!(outcome.web_info().unwrap(), "- Acme Rocket weighs 2 kg");
    }

    #[test]
    fn search_url_encodes_query() {
        let search = WebSearch::new(&CatalogConfig::default()).unwrap();
        let url = search.search_url("Acme Rocket specifications");
        assert_eq!(
            url.as_str(),
            "https://www.google.com/search?q=Acme+Rocket+specifications"
        );
    }
}
