//! The shape of the raw order export.
//!
//! The export is line-item granular: one row per product line, with order-level fields (date, fee) only populated on
//! some rows of a group. Continuation rows of the same order typically leave them blank.

use std::collections::HashMap;

pub const COL_ORDER_ID: &str = "order_id";
pub const COL_ORDER_DATE: &str = "ordered_at";
pub const COL_ITEM_NAME: &str = "item_name";
pub const COL_ITEM_VARIATION: &str = "item_variation";
pub const COL_ITEM_SUBTOTAL: &str = "item_subtotal";

/// Candidate column names for the order fee, in resolution order. The export renamed this column at some point and
/// both spellings are still in the wild, so the legacy name is checked first.
pub const FEE_COLUMN_ALIASES: [&str; 2] = ["fee", "fee_total"];

/// One raw export row: a mapping from column name to string value. Consumed once by the aggregator.
#[derive(Debug, Clone, Default)]
pub struct RawLineItemRow {
    columns: HashMap<String, String>,
}

impl RawLineItemRow {
    pub fn new(columns: HashMap<String, String>) -> Self {
        Self { columns }
    }

    /// The trimmed value of the given column, or `None` when the column is absent.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(|v| v.trim())
    }

    /// The trimmed value of the given column, treating an absent column as blank.
    pub fn get_or_blank(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    /// Resolve an aliased column: the first alias with a non-blank value wins.
    pub fn first_of(&self, aliases: &[&str]) -> Option<&str> {
        aliases.iter().map(|col| self.get_or_blank(col)).find(|v| !v.is_empty())
    }
}

impl FromIterator<(String, String)> for RawLineItemRow {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self { columns: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod test {
    use crate::test_utils::row;

    use super::*;

    #[test]
    fn fee_alias_resolution_prefers_the_legacy_spelling() {
        let r = row(&[("fee", "-100"), ("fee_total", "-999")]);
        assert_eq!(r.first_of(&FEE_COLUMN_ALIASES), Some("-100"));
        let r = row(&[("fee", ""), ("fee_total", "-250")]);
        assert_eq!(r.first_of(&FEE_COLUMN_ALIASES), Some("-250"));
        let r = row(&[("fee", ""), ("fee_total", "")]);
        assert_eq!(r.first_of(&FEE_COLUMN_ALIASES), None);
    }

    #[test]
    fn values_are_trimmed() {
        let r = row(&[(COL_ORDER_ID, " A-1 ")]);
        assert_eq!(r.get(COL_ORDER_ID), Some("A-1"));
        assert_eq!(r.get_or_blank(COL_ORDER_DATE), "");
    }
}
