//! Loader normalization tests
//!
//! Tests for turning a decoded table into inventory records including:
//! - Header trimming and required column validation
//! - Derived Diff Stock and value columns
//! - Column order independence

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{normalize, parse_decimal, Cell, LoadError, RawTable, REQUIRED_COLUMNS};
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
    RawTable::new(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|cells| cells.iter().map(|c| Cell::from(*c)).collect())
            .collect(),
    )
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Headers with stray whitespace still match
    #[test]
    fn test_padded_headers() {
        let raw = table(
            &["  Category", "Item Name ", " Item No ", "Barcode\t", "Book Stock", " Phys Stock"],
            &[&["Dairy", "Milk", "M-1", "5012345678900", "24", "20"]],
        );
        let dataset = normalize(&raw).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records[0].diff_stock, dec("-4"));
        assert!(!dataset.has_cost_price);
        assert_eq!(dataset.records[0].book_value, None);
    }

    /// Every missing column is reported, in canonical order
    #[test]
    fn test_all_missing_columns_reported() {
        let raw = table(&["Barcode", "Category", "Notes"], &[]);
        assert_eq!(
            normalize(&raw),
            Err(LoadError::MissingColumns {
                columns: vec![
                    "Item Name".to_string(),
                    "Item No".to_string(),
                    "Book Stock".to_string(),
                    "Phys Stock".to_string(),
                ],
            })
        );
    }

    /// Case differences are not forgiven
    #[test]
    fn test_header_case_is_preserved() {
        let raw = table(
            &["category", "Item Name", "Item No", "Barcode", "Book Stock", "Phys Stock"],
            &[],
        );
        assert!(matches!(
            normalize(&raw),
            Err(LoadError::MissingColumns { columns }) if columns == vec!["Category".to_string()]
        ));
    }

    /// Cost price gives the three value columns
    #[test]
    fn test_values_from_cost_price() {
        let raw = table(
            &["Category", "Item Name", "Item No", "Barcode", "Book Stock", "Phys Stock", "Cost Price"],
            &[
                &["Dairy", "Milk", "M-1", "1", "1,200", "1,150", "2.5"],
                &["Dairy", "Cream", "M-2", "2", "10", "12", ""],
            ],
        );
        let dataset = normalize(&raw).unwrap();
        assert!(dataset.has_cost_price);

        let milk = &dataset.records[0];
        assert_eq!(milk.book_stock, dec("1200"));
        assert_eq!(milk.book_value, Some(dec("3000")));
        assert_eq!(milk.phys_value, Some(dec("2875")));
        assert_eq!(milk.diff_value, Some(dec("-125")));

        let cream = &dataset.records[1];
        assert_eq!(cream.cost_price, None);
        assert_eq!(cream.diff_value, None);
    }

    /// A supplied Diff Stock column is kept as-is
    #[test]
    fn test_supplied_diff_is_trusted() {
        let raw = table(
            &["Category", "Item Name", "Item No", "Barcode", "Book Stock", "Phys Stock", "Diff Stock"],
            &[&["Dairy", "Milk", "M-1", "1", "10", "8", "5"]],
        );
        let dataset = normalize(&raw).unwrap();
        assert!(dataset.diff_stock_supplied);
        assert_eq!(dataset.records[0].diff_stock, dec("5"));
    }

    /// Unparsable numbers carry their location
    #[test]
    fn test_invalid_number() {
        let raw = table(
            &["Category", "Item Name", "Item No", "Barcode", "Book Stock", "Phys Stock"],
            &[
                &["Dairy", "Milk", "M-1", "1", "10", "8"],
                &["Dairy", "Cream", "M-2", "2", "ten", "8"],
            ],
        );
        assert_eq!(
            normalize(&raw),
            Err(LoadError::InvalidNumber {
                row: 2,
                column: "Book Stock".to_string(),
                value: "ten".to_string(),
            })
        );
    }

    /// Number cells from a spreadsheet need no parsing
    #[test]
    fn test_number_cells() {
        let raw = RawTable::new(
            REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            vec![vec![
                Cell::from("Frozen"),
                Cell::from("Peas"),
                Cell::Number(dec("7")),
                Cell::Number(dec("5012345678900")),
                Cell::Number(dec("3.5")),
                Cell::Empty,
            ]],
        );
        let dataset = normalize(&raw).unwrap();
        let peas = &dataset.records[0];
        assert_eq!(peas.item_no, "7");
        assert_eq!(peas.barcode, "5012345678900");
        assert_eq!(peas.phys_stock, Decimal::ZERO);
        assert_eq!(peas.diff_stock, dec("-3.5"));
    }

    #[test]
    fn test_parse_decimal_forms() {
        assert_eq!(parse_decimal("1,234.50"), Some(dec("1234.5")));
        assert_eq!(parse_decimal(" -7 "), Some(dec("-7")));
        assert_eq!(parse_decimal("1.5e3"), Some(dec("1500")));
        assert_eq!(parse_decimal("n/a"), None);
        assert_eq!(parse_decimal(""), None);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for whitespace padding around a header
    fn padding_strategy() -> impl Strategy<Value = String> {
        prop_oneof![Just(""), Just(" "), Just("  "), Just("\t")].prop_map(str::to_string)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Column order and header padding do not change the records
        #[test]
        fn prop_column_order_is_irrelevant(
            order in Just((0..REQUIRED_COLUMNS.len()).collect::<Vec<usize>>()).prop_shuffle(),
            pads in prop::collection::vec((padding_strategy(), padding_strategy()), 6),
            book in 0i64..100000,
            phys in 0i64..100000
        ) {
            let values: [String; 6] = [
                "Frozen".to_string(),
                "Peas".to_string(),
                "P-1".to_string(),
                "123".to_string(),
                book.to_string(),
                phys.to_string(),
            ];

            let headers: Vec<String> = order
                .iter()
                .zip(&pads)
                .map(|(&i, (left, right))| format!("{}{}{}", left, REQUIRED_COLUMNS[i], right))
                .collect();
            let cells: Vec<Cell> = order.iter().map(|&i| Cell::from(values[i].as_str())).collect();

            let dataset = normalize(&RawTable::new(headers, vec![cells])).unwrap();
            let record = &dataset.records[0];
            prop_assert_eq!(&record.category, "Frozen");
            prop_assert_eq!(&record.barcode, "123");
            prop_assert_eq!(record.book_stock, Decimal::from(book));
            prop_assert_eq!(record.diff_stock, Decimal::from(phys - book));
        }

        /// Thousands separators never change the parsed value
        #[test]
        fn prop_thousands_separators(n in 0i64..1_000_000_000) {
            let plain = n.to_string();
            let mut grouped = String::new();
            for (i, ch) in plain.chars().enumerate() {
                if i > 0 && (plain.len() - i) % 3 == 0 {
                    grouped.push(',');
                }
                grouped.push(ch);
            }
            prop_assert_eq!(parse_decimal(&grouped), Some(Decimal::from(n)));
        }
    }
}
