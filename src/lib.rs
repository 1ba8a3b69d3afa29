//! # product-catalog
//!
//! Generate product catalog entries from photos using Vision Language Models
//! (VLMs), keep them in a document store and export the whole catalog as a
//! PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! photo
//!  │
//!  ├─ 1. Upload    sanitise filename, optionally stage bytes to disk
//!  ├─ 2. Encode    decode, re-encode as base64 PNG for the model
//!  ├─ 3. VLM       one call to gemini / gpt-4.1 / claude / …
//!  ├─ 4. Parse     cleanup, then product name + specifications block
//!  ├─ 5. Augment   web search when the specifications look thin
//!  ├─ 6. Classify  keyword table → category
//!  └─ 7. Store     JSON document in SQLite (image inline as base64)
//! ```
//!
//! Export reads every stored record back, lays out images and text page by
//! page and renders the PDF with pdfium.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use product_catalog::{
//!     CatalogBuilder, CatalogConfig, LlmProductModel, SqliteCatalogStore, Upload,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from GEMINI_API_KEY / OPENAI_API_KEY / ANTHROPIC_API_KEY
//!     let config = Arc::new(CatalogConfig::default());
//!     let model = Arc::new(LlmProductModel::from_config(&config)?);
//!     let store = Arc::new(SqliteCatalogStore::connect("sqlite://catalog.db").await?);
//!     let builder = CatalogBuilder::with_web_search(model, store, config)?;
//!
//!     let bytes = std::fs::read("kettle.jpg")?;
//!     for result in builder.process_batch(vec![Upload::new("kettle.jpg", bytes)]).await {
//!         println!("{}", serde_json::to_string_pretty(&result)?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `catalog-server` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod prompts;
pub mod record;
pub mod server;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use catalog::CatalogBuilder;
pub use config::{CatalogConfig, CatalogConfigBuilder};
pub use error::{AugmentError, CatalogError, ItemError};
pub use export::{export_pdf, PageGeometry};
pub use pipeline::augment::{SearchSource, WebSearch};
pub use pipeline::llm::{LlmProductModel, ProductModel};
pub use pipeline::upload::Upload;
pub use record::{CatalogRecord, Category, ItemResult};
pub use server::{build_router, ApiError, AppState};
pub use store::{CatalogStore, SqliteCatalogStore};
