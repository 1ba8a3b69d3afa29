//! Extract the product name and specifications block from a model reply.
//!
//! Both fields come from one top-to-bottom scan. The name is taken from the
//! first `Product Name` line; the specifications block is everything after
//! the first `Specifications` line up to the end of the text. Missing markers
//! yield defaults, never errors.

/// Name used when the reply has no `Product Name` line.
pub const UNKNOWN_PRODUCT: &str = "Unknown";

const NAME_MARKER: &str = "product name";
const SPECS_MARKER: &str = "specifications";

/// Fields pulled out of a catalog reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    pub product_name: String,
    /// Lines after the specifications marker, trimmed; empty when absent.
    pub specifications: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecsScan {
    SeekingMarker,
    InSection,
}

/// Parse a catalog reply in a single pass.
pub fn parse_catalog_text(text: &str) -> ParsedEntry {
    let mut product_name: Option<String> = None;
    let mut state = SpecsScan::SeekingMarker;
    let mut spec_lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        let lower = line.to_lowercase();
        if product_name.is_none() && lower.starts_with(NAME_MARKER) {
            product_name = Some(value_after_colon(line));
        }

        match state {
            SpecsScan::SeekingMarker if lower.starts_with(SPECS_MARKER) => {
                state = SpecsScan::InSection;
            }
            SpecsScan::SeekingMarker => {}
            SpecsScan::InSection => spec_lines.push(line),
        }
    }

    ParsedEntry {
        product_name: product_name.unwrap_or_else(|| UNKNOWN_PRODUCT.to_string()),
        specifications: spec_lines.join("\n").trim().to_string(),
    }
}

fn value_after_colon(line: &str) -> String {
    match line.split_once(':') {
        Some((_, value)) => value.trim().to_string(),
        None => line.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_specs() {
        let text = "Product Name: Widget X\nCategory: Other\nSpecifications:\n- A: 1\n- B: 2";
        let parsed = parse_catalog_text(text);
        assert_eq!(parsed.product_name, "Widget X");
        assert_eq!(parsed.specifications, "- A: 1\n- B: 2");
    }

    #[test]
    fn missing_specs_is_empty() {
        let parsed = parse_catalog_text("Product Name: Lamp\nDescription: A lamp.");
        assert_eq!(parsed.product_name, "Lamp");
        assert_eq!(parsed.specifications, "");
    }

    #[test]
    fn missing_name_is_unknown() {
        let parsed = parse_catalog_text("This looks like a chair.");
        assert_eq!(parsed.product_name, UNKNOWN_PRODUCT);
    }

    #[test]
    fn first_marker_wins() {
        let text = "product name: First\nProduct Name: Second\nSpecifications:\n- a\nSpecifications: again\n- b";
        let parsed = parse_catalog_text(text);
        assert_eq!(parsed.product_name, "First");
        assert_eq!(parsed.specifications, "- a\nSpecifications: again\n- b");
    }

    #[test]
    fn name_found_after_specs_marker() {
        let parsed = parse_catalog_text("Specifications:\n- a\nProduct Name: Late");
        assert_eq!(parsed.product_name, "Late");
        assert_eq!(parsed.specifications, "- a\nProduct Name: Late");
    }

    #[test]
    fn name_keeps_text_after_first_colon_only() {
        let parsed = parse_catalog_text("Product Name: Clock: Model 3");
        assert_eq!(parsed.product_name, "Clock: Model 3");
    }

    #[test]
    fn indented_markers_do_not_match() {
        let parsed = parse_catalog_text("  Product Name: Hidden\n  Specifications:\n- a");
        assert_eq!(parsed.product_name, UNKNOWN_PRODUCT);
        assert_eq!(parsed.specifications, "");
    }
}
