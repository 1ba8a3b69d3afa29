//! Prompts and fixed texts for catalog-entry generation.
//!
//! Keeping every prompt here makes the response format the parser relies on
//! easy to audit: [`crate::pipeline::parse`] looks for the `Product Name:` and
//! `Specifications:` lines that [`DEFAULT_CATALOG_PROMPT`] asks for.
//!
//! Callers can override the default via [`crate::config::CatalogConfig::prompt`];
//! the constants here are used only when no override is provided.

/// Default instruction sent alongside each product image.
pub const DEFAULT_CATALOG_PROMPT: &str = r#"You are a product catalog generator. Given a product image, generate a structured catalog entry.

Format:
Product Name: <name>
Category: <category>
Description: <description>
Specifications:
- Feature 1: value
- Feature 2: value
..."#;

/// Heading placed between the model text and the web lookup result.
pub const WEB_INFO_HEADING: &str = "Additional Info from Web:";

/// Shown instead of snippets when the lookup found nothing relevant.
pub const NO_SPECS_FOUND: &str = "No detailed specs found online.";

/// Prefix for a lookup that failed; the reason follows.
pub const LOOKUP_FAILED_PREFIX: &str = "Web scraping failed";

/// Append the web lookup section to a catalog entry.
pub fn with_web_info(catalog_text: &str, web_info: &str) -> String {
    format!("{catalog_text}\n\n{WEB_INFO_HEADING}\n{web_info}")
}
