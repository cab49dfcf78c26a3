//! Placeholder tokens in layer SQL.
//!
//! Layer queries may embed `!bbox!`, `!scale_denominator!`, `!pixel_width!`
//! and `!pixel_height!`. Renderers replace them with viewport values; the
//! step resolver replaces them with neutral ones since it only needs column
//! metadata and full-domain aggregates.

use std::collections::HashMap;

/// Tokens recognized in layer SQL, without the surrounding `!`.
pub const TOKENS: [&str; 4] = ["bbox", "scale_denominator", "pixel_width", "pixel_height"];

/// Replaces every `!name!` in `sql` with `values[name]`.
///
/// Tokens missing from `values` are left untouched.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use torque_config::query::replace_tokens;
///
/// let values = HashMap::from([("bbox", "ST_MakeEnvelope(0,0,0,0)")]);
/// assert_eq!(
///     replace_tokens("SELECT * FROM t WHERE the_geom && !bbox!", &values),
///     "SELECT * FROM t WHERE the_geom && ST_MakeEnvelope(0,0,0,0)"
/// );
/// ```
pub fn replace_tokens(sql: &str, values: &HashMap<&str, &str>) -> String {
    let mut out = sql.to_string();
    for (name, replacement) in values {
        out = out.replace(&format!("!{}!", name), replacement);
    }
    out
}

/// Lists the known tokens present in `sql`, in [`TOKENS`] order.
pub fn tokens_in(sql: &str) -> Vec<&'static str> {
    TOKENS
        .into_iter()
        .filter(|name| sql.contains(&format!("!{}!", name)))
        .collect()
}

/// Returns `true` if `sql` contains any known token.
pub fn has_tokens(sql: &str) -> bool {
    !tokens_in(sql).is_empty()
}

/// Neutral replacements: a zero-area box with unit scale and pixel size.
pub fn neutral_values() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("bbox", "ST_MakeEnvelope(0,0,0,0)"),
        ("scale_denominator", "1"),
        ("pixel_width", "1"),
        ("pixel_height", "1"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQL: &str = "SELECT * FROM t WHERE g && !bbox! AND !pixel_width! * !pixel_width! < 5";

    #[test]
    fn test_replace_every_occurrence() {
        let values = HashMap::from([("pixel_width", "2")]);
        assert_eq!(
            replace_tokens(SQL, &values),
            "SELECT * FROM t WHERE g && !bbox! AND 2 * 2 < 5"
        );
    }

    #[test]
    fn test_replace_neutral() {
        let out = replace_tokens(SQL, &neutral_values());
        assert_eq!(
            out,
            "SELECT * FROM t WHERE g && ST_MakeEnvelope(0,0,0,0) AND 1 * 1 < 5"
        );
        assert!(!has_tokens(&out));
    }

    #[test]
    fn test_replace_leaves_unknown_tokens() {
        let out = replace_tokens("SELECT !other!", &neutral_values());
        assert_eq!(out, "SELECT !other!");
    }

    #[test]
    fn test_tokens_in() {
        assert_eq!(tokens_in(SQL), vec!["bbox", "pixel_width"]);
        assert!(tokens_in("SELECT 1").is_empty());
        assert!(has_tokens("!scale_denominator!"));
    }
}
