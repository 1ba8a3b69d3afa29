//! Keyword-based category classification.
//!
//! Groups are checked in table order and the first group with any keyword
//! found in the text wins, so a phone listing that mentions a "car charger"
//! stays in Electronics. Matching is plain substring containment.

use crate::record::Category;

/// Ordered `(label, keywords)` table. Order is the tie-break rule.
pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Electronics, &["laptop", "phone", "tablet", "tv", "headphones"]),
    (Category::Automobile, &["car", "bike", "scooter", "truck"]),
    (Category::Fashion, &["shirt", "jeans", "dress", "shoes", "sneakers"]),
    (Category::Sports, &["bat", "ball", "cricket", "tennis", "football"]),
    (Category::Furniture, &["sofa", "table", "chair", "bed"]),
    (Category::Appliances, &["fridge", "microwave", "washing machine"]),
    (Category::Books, &["book", "novel", "textbook"]),
    (Category::Beauty, &["makeup", "cream", "perfume"]),
    (Category::Toys, &["toy", "doll", "lego"]),
];

/// Classify a product from its name and descriptive text.
pub fn classify_category(name: &str, text: &str) -> Category {
    let haystack = format!("{name} {text}").to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_group_match() {
        assert_eq!(classify_category("Gaming Laptop", ""), Category::Electronics);
        assert_eq!(classify_category("Mountain Bike", ""), Category::Automobile);
        assert_eq!(classify_category("Denim Jeans", ""), Category::Fashion);
        assert_eq!(classify_category("Cricket kit", ""), Category::Sports);
        assert_eq!(classify_category("Recliner Sofa", ""), Category::Furniture);
        assert_eq!(classify_category("Steel", "a compact microwave"), Category::Appliances);
        assert_eq!(classify_category("Paperback Novel", ""), Category::Books);
        assert_eq!(classify_category("Night Cream", ""), Category::Beauty);
        assert_eq!(classify_category("Rag Doll", ""), Category::Toys);
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(classify_category("SMART TV", ""), Category::Electronics);
    }

    #[test]
    fn no_match_is_other() {
        assert_eq!(classify_category("Garden hose", "green, 20m"), Category::Other);
        assert_eq!(classify_category("", ""), Category::Other);
    }

    #[test]
    fn priority_order_is_pinned() {
        // Electronics beats Automobile.
        assert_eq!(
            classify_category("Phone", "comes with a car charger"),
            Category::Electronics
        );
        // Automobile beats Sports.
        assert_eq!(classify_category("Truck", "with a football decal"), Category::Automobile);
        // Furniture beats Books.
        assert_eq!(classify_category("Chair", "book holder"), Category::Furniture);
        // Beauty beats Toys.
        assert_eq!(classify_category("Perfume", "toy sized bottle"), Category::Beauty);

        let labels: Vec<Category> = CATEGORY_KEYWORDS.iter().map(|(c, _)| *c).collect();
        assert_eq!(labels, &Category::ALL[..9]);
    }

    #[test]
    fn substring_matching_is_literal() {
        // "battery" contains "bat".
        assert_eq!(classify_category("Spare battery pack", ""), Category::Sports);
    }
}
