//! Error types for the product-catalog library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`CatalogError`]: **Fatal** for one operation: the store cannot be
//!   reached, the PDF engine cannot be bound, the provider is not configured.
//!   Returned as `Err(CatalogError)` from store, export and setup functions.
//!
//! * [`ItemError`]: **Non-fatal**: a single upload failed (not an image,
//!   model call rejected, store write failed) but the rest of the batch is
//!   fine. Stored inside [`crate::record::ItemResult::Failure`] so callers see
//!   partial success instead of losing the whole batch to one bad file.
//!
//! * [`AugmentError`]: **Recovered**: the web lookup for extra specifications
//!   failed. Never leaves [`crate::pipeline::augment`]; it is rendered as an
//!   informational line in the catalog entry instead.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the product-catalog library.
///
/// Item-level failures use [`ItemError`] and are reported per upload rather
/// than propagated here.
#[derive(Debug, Error)]
pub enum CatalogError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Store errors ──────────────────────────────────────────────────────
    /// The document store rejected a read or write.
    #[error("Document store error: {0}")]
    Store(#[from] sqlx::Error),

    /// A persisted document could not be (de)serialised.
    #[error("Malformed catalog document: {0}")]
    Document(#[from] serde_json::Error),

    // ── Export errors ─────────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDF export needs the pdfium shared library. You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium.\n\
  • Place libpdfium next to the binary or in the working directory.\n\
  • Install pdfium system-wide so the loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    /// pdfium returned an error while building the export document.
    #[error("PDF export failed: {0}")]
    ExportFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the upload staging directory.
    #[error("Failed to prepare upload directory '{path}': {source}")]
    UploadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single uploaded file.
///
/// The batch continues after any of these.
#[derive(Debug, Clone, Error, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ItemError {
    /// Raw bytes could not be written to the upload directory.
    #[error("could not stage upload '{filename}': {detail}")]
    StagingFailed { filename: String, detail: String },

    /// The payload is not a decodable image.
    #[error("cannot identify image file '{filename}': {detail}")]
    ImageDecode { filename: String, detail: String },

    /// The vision model rejected the request or the transport failed.
    #[error("model call failed: {detail}")]
    ModelFailed { detail: String },

    /// The vision model did not answer in time.
    #[error("model call timed out after {secs}s")]
    ModelTimeout { secs: u64 },

    /// The vision model answered with no text at all.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// The finished record could not be persisted.
    #[error("failed to save catalog entry: {detail}")]
    StoreFailed { detail: String },
}

/// Why a web lookup for extra specifications produced nothing.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AugmentError {
    /// DNS, TLS, connection reset, body read failure.
    #[error("{0}")]
    Transport(String),

    /// The search request exceeded its timeout.
    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The configured snippet selector is not valid CSS.
    #[error("invalid snippet selector '{selector}': {detail}")]
    Selector { selector: String, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_decode_display_names_file() {
        let e = ItemError::ImageDecode {
            filename: "broken.png".into(),
            detail: "unsupported format".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("broken.png"), "got: {msg}");
        assert!(msg.contains("unsupported format"), "got: {msg}");
    }

    #[test]
    fn model_timeout_display() {
        let e = ItemError::ModelTimeout { secs: 120 };
        assert!(e.to_string().contains("120s"));
    }

    #[test]
    fn augment_timeout_display() {
        let e = AugmentError::Timeout { secs: 10 };
        assert_eq!(e.to_string(), "request timed out after 10s");
    }

    #[test]
    fn pdfium_binding_display_mentions_env_var() {
        let e = CatalogError::PdfiumBindingFailed("not found".into());
        assert!(e.to_string().contains("PDFIUM_LIB_PATH"));
    }
}
