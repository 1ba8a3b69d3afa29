//! Configuration types for catalog generation and export.
//!
//! All behaviour is controlled through [`CatalogConfig`], built via its
//! [`CatalogConfigBuilder`]. The same value is shared by the HTTP handlers,
//! the catalog builder and the exporter.

use crate::error::CatalogError;
use crate::export::PageGeometry;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// CSS selector for result snippets on the search results page.
pub const DEFAULT_SNIPPET_SELECTOR: &str = "div.BNeawe.s3v9rd.AP7Wnd";

/// Marker a model writes when it could not read a specification from the image.
pub const DEFAULT_MISSING_INFO_MARKER: &str = "Requires further information";

/// Configuration for catalog generation and PDF export.
///
/// Built via [`CatalogConfig::builder()`] or using
/// [`CatalogConfig::default()`].
///
/// # Example
/// ```rust
/// use product_catalog::CatalogConfig;
///
/// let config = CatalogConfig::builder()
///     .model("gemini-2.0-flash")
///     .provider_name("gemini")
///     .search_timeout_secs(5)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct CatalogConfig {
    /// LLM model identifier, e.g. "gemini-2.0-flash", "gpt-4.1-mini".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai", "ollama").
    /// If None along with `provider`, the provider is auto-detected.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for the model. Default: 0.2.
    pub temperature: f32,

    /// Maximum tokens the model may generate per image. Default: 2048.
    pub max_tokens: usize,

    /// Per-image model call timeout in seconds. Default: 120.
    pub model_timeout_secs: u64,

    /// Custom instruction prompt. If None, uses the built-in default.
    pub prompt: Option<String>,

    /// Look up thin specifications on the web. Default: true.
    pub search_enabled: bool,

    /// Base URL of the search engine; `/search?q=` is appended.
    pub search_base_url: String,

    /// Search fetch timeout in seconds. Default: 10.
    pub search_timeout_secs: u64,

    /// User agent sent with search requests.
    pub user_agent: String,

    /// CSS selector matching result snippets.
    pub snippet_selector: String,

    /// Maximum number of snippets kept from one lookup. Default: 5.
    pub max_snippets: usize,

    /// A specifications block with fewer lines than this is looked up. Default: 5.
    pub min_spec_lines: usize,

    /// A specifications line containing this text triggers a lookup.
    pub missing_info_marker: String,

    /// Directory that receives a copy of every upload. None keeps uploads in memory only.
    pub upload_dir: Option<PathBuf>,

    /// Maximum accepted request body for one upload batch, in bytes. Default: 32 MiB.
    pub max_upload_bytes: usize,

    /// Page geometry for PDF export. Default: A4.
    pub page: PageGeometry,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.2,
            max_tokens: 2048,
            model_timeout_secs: 120,
            prompt: None,
            search_enabled: true,
            search_base_url: "https://www.google.com".to_string(),
            search_timeout_secs: 10,
            user_agent: "Mozilla/5.0".to_string(),
            snippet_selector: DEFAULT_SNIPPET_SELECTOR.to_string(),
            max_snippets: 5,
            min_spec_lines: 5,
            missing_info_marker: DEFAULT_MISSING_INFO_MARKER.to_string(),
            upload_dir: None,
            max_upload_bytes: 32 * 1024 * 1024,
            page: PageGeometry::default(),
        }
    }
}

impl fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("model_timeout_secs", &self.model_timeout_secs)
            .field("search_enabled", &self.search_enabled)
            .field("search_base_url", &self.search_base_url)
            .field("search_timeout_secs", &self.search_timeout_secs)
            .field("max_snippets", &self.max_snippets)
            .field("min_spec_lines", &self.min_spec_lines)
            .field("upload_dir", &self.upload_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("page", &self.page)
            .finish()
    }
}

impl CatalogConfig {
    /// Create a new builder for `CatalogConfig`.
    pub fn builder() -> CatalogConfigBuilder {
        CatalogConfigBuilder {
            config: Self::default(),
        }
    }

    /// The prompt sent with each image.
    pub fn prompt(&self) -> &str {
        self.prompt
            .as_deref()
            .unwrap_or(crate::prompts::DEFAULT_CATALOG_PROMPT)
    }
}

/// Builder for [`CatalogConfig`].
#[derive(Debug)]
pub struct CatalogConfigBuilder {
    config: CatalogConfig,
}

impl CatalogConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn model_timeout_secs(mut self, secs: u64) -> Self {
        self.config.model_timeout_secs = secs;
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = Some(prompt.into());
        self
    }

    pub fn search_enabled(mut self, v: bool) -> Self {
        self.config.search_enabled = v;
        self
    }

    pub fn search_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.search_base_url = url.into();
        self
    }

    pub fn search_timeout_secs(mut self, secs: u64) -> Self {
        self.config.search_timeout_secs = secs;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn snippet_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.snippet_selector = selector.into();
        self
    }

    pub fn max_snippets(mut self, n: usize) -> Self {
        self.config.max_snippets = n;
        self
    }

    pub fn min_spec_lines(mut self, n: usize) -> Self {
        self.config.min_spec_lines = n;
        self
    }

    pub fn missing_info_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.missing_info_marker = marker.into();
        self
    }

    pub fn upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.upload_dir = Some(dir.into());
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n.max(1024);
        self
    }

    pub fn page(mut self, page: PageGeometry) -> Self {
        self.config.page = page;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CatalogConfig, CatalogError> {
        let c = &self.config;
        if c.max_snippets == 0 {
            return Err(CatalogError::InvalidConfig(
                "max_snippets must be ≥ 1".into(),
            ));
        }
        if c.min_spec_lines == 0 {
            return Err(CatalogError::InvalidConfig(
                "min_spec_lines must be ≥ 1".into(),
            ));
        }
        if c.model_timeout_secs == 0 || c.search_timeout_secs == 0 {
            return Err(CatalogError::InvalidConfig(
                "Timeouts must be ≥ 1 second".into(),
            ));
        }
        if c.search_enabled {
            reqwest::Url::parse(&c.search_base_url).map_err(|e| {
                CatalogError::InvalidConfig(format!(
                    "search_base_url '{}' is not a valid URL: {}",
                    c.search_base_url, e
                ))
            })?;
            scraper::Selector::parse(&c.snippet_selector).map_err(|e| {
                CatalogError::InvalidConfig(format!(
                    "snippet_selector '{}' is not valid CSS: {}",
                    c.snippet_selector, e
                ))
            })?;
        }
        c.page.validate()?;
        Ok(self.config)
    }
}
