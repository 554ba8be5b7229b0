//! Shared data model for extracted menu rows.

use serde::{Deserialize, Serialize};

/// Category assigned to items that appear before any section heading.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Literal marker copied into `comment` when a card advertises the item
/// as unavailable.
pub const UNAVAILABLE: &str = "Unavailable";

/// One row of extracted menu output.
///
/// Field order is significant: it is the column order of the exported
/// spreadsheet (`Category, Item, Description, Price, Comment`). Prices are
/// kept as display text so currency symbols and ranges round-trip untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MenuRecord {
    /// Nearest preceding section heading, or [`UNCATEGORIZED`].
    pub category: String,
    /// Item name. Never empty on an emitted record.
    pub item: String,
    /// Item description, empty when the card has none.
    pub description: String,
    /// Display-text price, empty when the card has none.
    pub price: String,
    /// Empty or the literal [`UNAVAILABLE`] marker.
    pub comment: String,
}

impl MenuRecord {
    /// Column headers in export order.
    pub const COLUMNS: [&'static str; 5] =
        ["Category", "Item", "Description", "Price", "Comment"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_pascal_case_keys() {
        let record = MenuRecord {
            category: "Drinks".to_string(),
            item: "Latte".to_string(),
            description: "Hot espresso drink".to_string(),
            price: "$4.00".to_string(),
            comment: UNAVAILABLE.to_string(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Category"], "Drinks");
        assert_eq!(json["Item"], "Latte");
        assert_eq!(json["Description"], "Hot espresso drink");
        assert_eq!(json["Price"], "$4.00");
        assert_eq!(json["Comment"], "Unavailable");
    }

    #[test]
    fn columns_match_field_declaration_order() {
        assert_eq!(
            MenuRecord::COLUMNS,
            ["Category", "Item", "Description", "Price", "Comment"]
        );
    }
}
