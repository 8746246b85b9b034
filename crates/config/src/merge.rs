//! Structural merge of configuration tables.
//!
//! Merge semantics:
//! - Tables: deep-merge by key (recursive)
//! - Arrays: REPLACE (overlay wins entirely, no element-wise merge)
//! - Scalars: override (overlay wins)
//! - Absent: a key missing from the overlay keeps the base value
//!
//! Both inputs are borrowed; every merge builds a new table.

use toml::{Table, Value};

/// Deep merge `overlay` onto `base`, returning a new table.
///
/// Keys are visited in `base` order first, then the keys only `overlay` has.
pub fn merge_tables(base: &Table, overlay: &Table) -> Table {
    let mut merged = Table::new();

    for (key, base_value) in base {
        let value = match overlay.get(key) {
            Some(overlay_value) => merge_values(base_value, overlay_value),
            None => base_value.clone(),
        };
        merged.insert(key.clone(), value);
    }

    for (key, overlay_value) in overlay {
        if !base.contains_key(key) {
            merged.insert(key.clone(), overlay_value.clone());
        }
    }

    merged
}

/// Merge two values present under the same key.
pub fn merge_values(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            Value::Table(merge_tables(base_table, overlay_table))
        }
        // Arrays and scalars of any shape: overlay wins
        (_, overlay) => overlay.clone(),
    }
}

/// Merge optional values, treating `None` as "no opinion".
pub fn merge_optional(base: Option<&Value>, overlay: Option<&Value>) -> Option<Value> {
    match (base, overlay) {
        (Some(base), Some(overlay)) => Some(merge_values(base, overlay)),
        (Some(base), None) => Some(base.clone()),
        (None, Some(overlay)) => Some(overlay.clone()),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(text: &str) -> Table {
        toml::from_str::<Table>(text).unwrap()
    }

    #[test]
    fn test_scalar_override() {
        let result = merge_tables(&table("timeout = 100"), &table("timeout = 200"));
        assert_eq!(result["timeout"].as_integer(), Some(200));
    }

    #[test]
    fn test_table_deep_merge() {
        let base = table(
            r#"
            [FABRIC]
            host = "a"
            user = "u"
            "#,
        );
        let overlay = table(
            r#"
            [FABRIC]
            host = "b"
            "#,
        );
        let result = merge_tables(&base, &overlay);

        assert_eq!(result["FABRIC"]["host"].as_str(), Some("b"));
        assert_eq!(result["FABRIC"]["user"].as_str(), Some("u"));
    }

    #[test]
    fn test_array_replace() {
        let base = table(r#"schemes = ["A", "B", "C"]"#);
        let overlay = table(r#"schemes = ["X", "Y"]"#);
        let result = merge_tables(&base, &overlay);

        let schemes = result["schemes"].as_array().unwrap();
        assert_eq!(schemes.len(), 2);
        assert_eq!(schemes[0].as_str(), Some("X"));
        assert_eq!(schemes[1].as_str(), Some("Y"));
    }

    #[test]
    fn test_overlay_table_replaces_scalar_and_scalar_replaces_table() {
        let base = table("a = 1\n[b]\nc = 2");
        let overlay = table("b = \"flat\"\n[a]\nnested = true");
        let result = merge_tables(&base, &overlay);

        assert_eq!(result["a"]["nested"].as_bool(), Some(true));
        assert_eq!(result["b"].as_str(), Some("flat"));
    }

    #[test]
    fn test_add_new_key_and_keep_base_order() {
        let base = table("z = 1\na = 2");
        let overlay = table("m = 3\nz = 4");
        let result = merge_tables(&base, &overlay);

        let keys: Vec<_> = result.keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(result["z"].as_integer(), Some(4));
    }

    #[test]
    fn test_inputs_untouched() {
        let base = table("[s]\nx = 1\ny = [1, 2]");
        let overlay = table("[s]\ny = [3]\nz = 2");
        let base_before = base.clone();
        let overlay_before = overlay.clone();

        let _ = merge_tables(&base, &overlay);

        assert_eq!(base, base_before);
        assert_eq!(overlay, overlay_before);
    }

    #[test]
    fn test_merge_optional_absent_overlay_keeps_base() {
        let base = Value::String("keep".into());
        assert_eq!(merge_optional(Some(&base), None), Some(base.clone()));
        assert_eq!(merge_optional(None, None), None);
    }
}
