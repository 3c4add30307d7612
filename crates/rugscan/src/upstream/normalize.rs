//! Normalization of user queries and loosely-typed upstream fields.

/// Turn a raw query into a slug-like identifier.
///
/// A `"Label - slug"` form (what the search box autocompletes to) yields the
/// trailing slug; anything else has whitespace runs collapsed to `-` and is
/// lower-cased.
pub fn clean_coin_id(input: &str) -> String {
    let input = input.trim();
    if let Some((_, tail)) = input.rsplit_once(" - ") {
        let tail = tail.trim();
        if !tail.is_empty() && !tail.contains(char::is_whitespace) {
            return tail.to_string();
        }
    }
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Parse a decimal quantity string as returned by explorers (raw token units).
pub fn parse_quantity(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    (v.is_finite() && v >= 0.0).then_some(v)
}

/// Treat blank strings as absent.
pub(crate) fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
