/// Shown wherever a KPI value is absent, in narratives and in the report.
pub const PLACEHOLDER: &str = "n/a";

/// Format an optional value at the given precision, or the `n/a` placeholder.
pub fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => PLACEHOLDER.to_string(),
    }
}

/// Take at most `max` characters of `s` (character-based, so multi-byte
/// text never gets split mid-codepoint).
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
