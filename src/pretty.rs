//! Aligned key/value tables for logging small maps.

use std::collections::BTreeMap;

/// Default total width reserved for a value column.
pub const DEFAULT_VALUE_WIDTH: usize = 60;

const DOTDOTDOT: &str = "...";

/// Render `map` as one `| :key => |value|` row per entry, keys sorted.
///
/// Keys are padded to a common width. Values longer than `value_width - 5`
/// characters are cut and marked with `...`.
pub fn table(map: &BTreeMap<String, String>, value_width: usize) -> String {
    let val_width = value_width.saturating_sub(5);
    let key_width = map.keys().map(|k| k.chars().count()).max().unwrap_or(0) + 3;

    map.iter()
        .map(|(key, value)| {
            let shown = if value.chars().count() <= val_width {
                value.clone()
            } else {
                let cut: String = value.chars().take(val_width).collect();
                format!("{}{}", cut, DOTDOTDOT)
            };
            format!(
                "| {:<width$} => |{}|",
                format!(":{}", key),
                shown,
                width = key_width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_table_aligns_keys_and_sorts() {
        let rendered = table(&map(&[("show", "Columbo"), ("id", "7")]), DEFAULT_VALUE_WIDTH);
        assert_eq!(
            rendered,
            "| :id     => |7|\n| :show   => |Columbo|"
        );
    }

    #[test]
    fn test_table_truncates_long_values() {
        let rendered = table(&map(&[("k", "abcdefghij")]), 10);
        assert_eq!(rendered, "| :k   => |abcde...|");
    }

    #[test]
    fn test_table_empty_map() {
        assert_eq!(table(&BTreeMap::new(), DEFAULT_VALUE_WIDTH), "");
    }
}
