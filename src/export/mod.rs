//! PDF export of the whole catalog.
//!
//! ```text
//! store ──▶ decode images ──▶ layout ──▶ render
//!           (skip bad ones)   (pure)     (pdfium, spawn_blocking)
//! ```
//!
//! [`layout`] turns records into pages of positioned draw operations and is
//! tested without pdfium. [`render`] replays those operations into a pdfium
//! document. Records whose stored image cannot be decoded are left out of the
//! export with a warning; only store, binding and serialisation failures
//! abort it.

pub mod layout;
pub mod render;

use crate::error::CatalogError;
use crate::pipeline::encode::decode_stored;
use crate::record::CatalogRecord;
use crate::store::CatalogStore;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

pub use layout::{layout_document, DrawOp, PageLayout, RecordBlock};

/// Page size and spacing for the exported document, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    /// Left, right, top and bottom margin.
    pub margin: f32,
    /// Tallest an image may be drawn.
    pub max_image_height: f32,
    /// Space between an image and its text.
    pub image_gap: f32,
    pub font_size: f32,
    /// Baseline-to-baseline distance for text lines.
    pub line_height: f32,
    /// A text line is never started below this height.
    pub text_floor: f32,
    /// Space after each record.
    pub record_gap: f32,
    /// A new record starts on a fresh page when less than this is left.
    pub min_record_space: f32,
}

impl Default for PageGeometry {
    /// A4 portrait.
    fn default() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin: 40.0,
            max_image_height: 300.0,
            image_gap: 10.0,
            font_size: 10.0,
            line_height: 12.0,
            text_floor: 100.0,
            record_gap: 40.0,
            min_record_space: 200.0,
        }
    }
}

impl PageGeometry {
    /// Width available between the margins.
    pub fn printable_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Cursor position at the top of a fresh page.
    pub fn top(&self) -> f32 {
        self.height - self.margin
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("max_image_height", self.max_image_height),
            ("font_size", self.font_size),
            ("line_height", self.line_height),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(CatalogError::InvalidConfig(format!(
                    "page.{name} must be positive, got {value}"
                )));
            }
        }
        if self.margin < 0.0 || self.printable_width() <= 0.0 {
            return Err(CatalogError::InvalidConfig(format!(
                "page margin {} leaves no printable width on a {}pt page",
                self.margin, self.width
            )));
        }
        if self.text_floor >= self.top() || self.min_record_space >= self.top() {
            return Err(CatalogError::InvalidConfig(
                "page text_floor and min_record_space must be below the top margin".into(),
            ));
        }
        Ok(())
    }
}

/// Render every stored record into one PDF and return its bytes.
pub async fn export_pdf(
    store: &dyn CatalogStore,
    geometry: &PageGeometry,
) -> Result<Vec<u8>, CatalogError> {
    let start = Instant::now();
    let records = store.find_all().await?;
    info!("Exporting {} catalog entries", records.len());

    let geometry = *geometry;
    let bytes = tokio::task::spawn_blocking(move || {
        let (blocks, images) = prepare_records(records);
        let pages = layout_document(&blocks, &geometry);
        render::render_pdf(&pages, &images, &geometry)
    })
    .await
    .map_err(|e| CatalogError::Internal(format!("Export task panicked: {}", e)))??;

    info!("Exported {} bytes in {:?}", bytes.len(), start.elapsed());
    Ok(bytes)
}

/// Decode each record's image, dropping records that fail.
///
/// Returns the layout blocks and their images, index-aligned.
pub fn prepare_records(records: Vec<CatalogRecord>) -> (Vec<RecordBlock>, Vec<DynamicImage>) {
    let mut blocks = Vec::with_capacity(records.len());
    let mut images = Vec::with_capacity(records.len());

    for record in records {
        match decode_stored(&record.image_data) {
            Ok(img) => {
                blocks.push(RecordBlock {
                    image_width: img.width(),
                    image_height: img.height(),
                    text: record.catalog_entry,
                });
                images.push(img);
            }
            Err(reason) => {
                warn!("Skipping '{}' in export — {}", record.filename, reason);
            }
        }
    }
    (blocks, images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::encode::encode_for_storage;
    use crate::record::Category;
    use chrono::Utc;
    use image::{Rgba, RgbaImage};
    use std::io::Cursor;

    fn record(image_data: String, text: &str) -> CatalogRecord {
        CatalogRecord {
            filename: "x.png".into(),
            product_name: "X".into(),
            category: Category::Other,
            catalog_entry: text.into(),
            web_scraped_info: String::new(),
            image_data,
            timestamp: Utc::now(),
        }
    }

    fn png(w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([1, 2, 3, 255])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn default_geometry_is_valid_a4() {
        let g = PageGeometry::default();
        g.validate().unwrap();
        assert!((g.printable_width() - 515.28).abs() < 0.01);
        assert!((g.top() - 801.89).abs() < 0.01);
    }

    #[test]
    fn oversized_margin_rejected() {
        let g = PageGeometry {
            margin: 400.0,
            ..Default::default()
        };
        assert!(matches!(g.validate(), Err(CatalogError::InvalidConfig(_))));
    }

    #[test]
    fn undecodable_records_are_dropped() {
        let records = vec![
            record(encode_for_storage(&png(4, 2)), "first"),
            record("not base64 at all!".into(), "second"),
            record(encode_for_storage(b"not an image"), "third"),
            record(encode_for_storage(&png(2, 2)), "fourth"),
        ];
        let (blocks, images) = prepare_records(records);
        let texts: Vec<_> = blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, ["first", "fourth"]);
        assert_eq!(images.len(), 2);
        assert_eq!((blocks[0].image_width, blocks[0].image_height), (4, 2));
    }
}
