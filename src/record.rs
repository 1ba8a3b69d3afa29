//! Catalog data types: the persisted record and the per-upload result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed product taxonomy. Serialised as the bare label, e.g. `"Electronics"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    Electronics,
    Automobile,
    Fashion,
    Sports,
    Furniture,
    Appliances,
    Books,
    Beauty,
    Toys,
    #[default]
    Other,
}

impl Category {
    /// Every label, in declaration order.
    pub const ALL: [Category; 10] = [
        Category::Electronics,
        Category::Automobile,
        Category::Fashion,
        Category::Sports,
        Category::Furniture,
        Category::Appliances,
        Category::Books,
        Category::Beauty,
        Category::Toys,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Automobile => "Automobile",
            Category::Fashion => "Fashion",
            Category::Sports => "Sports",
            Category::Furniture => "Furniture",
            Category::Appliances => "Appliances",
            Category::Books => "Books",
            Category::Beauty => "Beauty",
            Category::Toys => "Toys",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One persisted catalog entry, including its source image.
///
/// Records are written once and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Sanitised upload name.
    pub filename: String,
    /// Name extracted from the model reply, `"Unknown"` when absent.
    pub product_name: String,
    pub category: Category,
    /// Model text, plus the web lookup section when one ran.
    pub catalog_entry: String,
    /// Raw web lookup text; empty when no lookup ran.
    pub web_scraped_info: String,
    /// Original upload bytes, standard base64.
    pub image_data: String,
    pub timestamp: DateTime<Utc>,
}

/// Outcome for one uploaded file, in the shape the HTTP API returns.
///
/// Serialised untagged: a success carries the entry fields, a failure carries
/// `error` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemResult {
    Success {
        filename: String,
        product_name: String,
        category: Category,
        catalog_entry: String,
    },
    Failure {
        filename: String,
        error: String,
    },
}

impl ItemResult {
    pub fn filename(&self) -> &str {
        match self {
            ItemResult::Success { filename, .. } | ItemResult::Failure { filename, .. } => filename,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ItemResult::Success { .. })
    }
}

impl From<&CatalogRecord> for ItemResult {
    fn from(record: &CatalogRecord) -> Self {
        ItemResult::Success {
            filename: record.filename.clone(),
            product_name: record.product_name.clone(),
            category: record.category,
            catalog_entry: record.catalog_entry.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_serialises_as_label() {
        let v = serde_json::to_value(Category::Appliances).unwrap();
        assert_eq!(v, json!("Appliances"));
        assert_eq!(Category::default(), Category::Other);
    }

    #[test]
    fn failure_result_has_only_filename_and_error() {
        let r = ItemResult::Failure {
            filename: "a.png".into(),
            error: "boom".into(),
        };
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({"filename": "a.png", "error": "boom"})
        );
    }

    #[test]
    fn success_result_shape() {
        let r = ItemResult::Success {
            filename: "a.png".into(),
            product_name: "Widget".into(),
            category: Category::Toys,
            catalog_entry: "Product Name: Widget".into(),
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["category"], "Toys");
        assert!(v.get("error").is_none());
        assert!(r.is_success());
    }
}
