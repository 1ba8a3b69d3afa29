//! Batch catalog generation: one upload in, one [`ItemResult`] out.
//!
//! [`CatalogBuilder`] walks a batch sequentially. Every step that can fail for
//! a single upload returns an [`ItemError`]; the builder turns it into a
//! failure result for that file and moves on to the next one, so a corrupt
//! image or a model hiccup never costs the rest of the batch.

use crate::config::CatalogConfig;
use crate::error::{CatalogError, ItemError};
use crate::pipeline::augment::{SearchSource, SpecAugmenter, WebSearch};
use crate::pipeline::llm::{generate_with_timeout, ProductModel};
use crate::pipeline::upload::{prepare_upload_dir, sanitize_filename, stage_upload, Upload};
use crate::pipeline::{classify, encode, parse, postprocess};
use crate::prompts::with_web_info;
use crate::record::{CatalogRecord, ItemResult};
use crate::store::CatalogStore;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Turns uploaded product photos into persisted catalog records.
#[derive(Clone)]
pub struct CatalogBuilder {
    model: Arc<dyn ProductModel>,
    augmenter: SpecAugmenter,
    store: Arc<dyn CatalogStore>,
    config: Arc<CatalogConfig>,
}

impl CatalogBuilder {
    /// Wire a builder from its collaborators.
    ///
    /// `search = None` disables web augmentation regardless of
    /// `config.search_enabled`.
    pub fn new(
        model: Arc<dyn ProductModel>,
        search: Option<Arc<dyn SearchSource>>,
        store: Arc<dyn CatalogStore>,
        config: Arc<CatalogConfig>,
    ) -> Self {
        let augmenter = SpecAugmenter::new(search, &config);
        Self {
            model,
            augmenter,
            store,
            config,
        }
    }

    /// Like [`CatalogBuilder::new`], with the HTTP search source built from
    /// `config` when search is enabled.
    pub fn with_web_search(
        model: Arc<dyn ProductModel>,
        store: Arc<dyn CatalogStore>,
        config: Arc<CatalogConfig>,
    ) -> Result<Self, CatalogError> {
        let search: Option<Arc<dyn SearchSource>> = if config.search_enabled {
            Some(Arc::new(WebSearch::new(&config)?))
        } else {
            None
        };
        Ok(Self::new(model, search, store, config))
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    /// Create the staging directory, when one is configured.
    pub async fn prepare(&self) -> Result<(), CatalogError> {
        if let Some(dir) = self.config.upload_dir.as_deref() {
            prepare_upload_dir(dir).await?;
        }
        Ok(())
    }

    /// Process every upload in order, returning one result per upload.
    pub async fn process_batch(&self, uploads: Vec<Upload>) -> Vec<ItemResult> {
        let start = Instant::now();
        let total = uploads.len();
        info!("Processing batch of {} uploads", total);

        let mut results = Vec::with_capacity(total);
        for (idx, upload) in uploads.into_iter().enumerate() {
            debug!("Item {}/{}: {}", idx + 1, total, upload.filename);
            let result = match self.process_item(&upload).await {
                Ok(record) => ItemResult::from(&record),
                Err(e) => {
                    let failure = ItemResult::Failure {
                        filename: upload.filename,
                        error: e.to_string(),
                    };
                    warn!("Item '{}' failed — {}", failure.filename(), e);
                    failure
                }
            };
            results.push(result);
        }

        let ok = results.iter().filter(|r| r.is_success()).count();
        info!(
            "Batch complete: {}/{} succeeded in {:?}",
            ok,
            total,
            start.elapsed()
        );
        results
    }

    /// Run the full pipeline for one upload and persist the record.
    pub async fn process_item(&self, upload: &Upload) -> Result<CatalogRecord, ItemError> {
        let filename = sanitize_filename(&upload.filename);

        if let Some(dir) = self.config.upload_dir.as_deref() {
            stage_upload(dir, &filename, &upload.bytes).await?;
        }

        let image = encode::decode_upload(&filename, &upload.bytes)?;
        let payload = encode::encode_for_model(&image).map_err(|e| ItemError::ImageDecode {
            filename: filename.clone(),
            detail: e.to_string(),
        })?;
        drop(image);

        let raw = generate_with_timeout(
            self.model.as_ref(),
            self.config.prompt(),
            payload,
            self.config.model_timeout_secs,
        )
        .await?;
        if raw.trim().is_empty() {
            return Err(ItemError::EmptyResponse);
        }

        // The entry keeps the reply as the model wrote it; cleanup only feeds
        // the parser and the classifier.
        let stored_text = raw.trim().to_string();
        let cleaned = postprocess::clean_reply(&raw);
        let model_text = if cleaned.is_empty() {
            stored_text.clone()
        } else {
            cleaned
        };
        let parsed = parse::parse_catalog_text(&model_text);
        debug!(
            "Parsed '{}' with {} spec lines",
            parsed.product_name,
            parsed.specifications.lines().count()
        );

        let web_info = self
            .augmenter
            .augment(&parsed.product_name, &parsed.specifications)
            .await
            .web_info();
        let category = classify::classify_category(&parsed.product_name, &model_text);
        let catalog_entry = match web_info.as_deref() {
            Some(info) => with_web_info(&stored_text, info),
            None => stored_text,
        };

        let record = CatalogRecord {
            filename,
            product_name: parsed.product_name,
            category,
            catalog_entry,
            web_scraped_info: web_info.unwrap_or_default(),
            image_data: encode::encode_for_storage(&upload.bytes),
            timestamp: Utc::now(),
        };

        self.store
            .insert_one(&record)
            .await
            .map_err(|e| ItemError::StoreFailed {
                detail: e.to_string(),
            })?;

        info!(
            "Catalogued '{}' as {} ({})",
            record.product_name, record.category, record.filename
        );
        Ok(record)
    }
}
