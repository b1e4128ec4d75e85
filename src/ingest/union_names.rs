//! Mapping of free-text union names to canonical names.

use crate::config::UnionAlias;

/// Returns the canonical name of the first rule matching `raw`.
///
/// `contains` patterns see the upper-cased text padded with one space on each
/// side; `starts_with` patterns see the trimmed upper-cased text.
pub fn canonical_union<'a>(raw: &str, rules: &'a [UnionAlias]) -> Option<&'a str> {
    let upper = raw.trim().to_uppercase();
    if upper.is_empty() {
        return None;
    }
    let padded = format!(" {} ", upper);

    rules
        .iter()
        .find(|rule| {
            rule.contains.iter().any(|p| padded.contains(p.as_str()))
                || rule.starts_with.iter().any(|p| upper.starts_with(p.as_str()))
        })
        .map(|rule| rule.canonical.as_str())
}

/// Normalizes a union name, keeping the trimmed raw text when no rule matches.
///
/// # Example
///
/// ```
/// use voucher_engine::config::PipelineSettings;
/// use voucher_engine::ingest::normalize_union;
///
/// let rules = PipelineSettings::default().union_normalization;
/// assert_eq!(normalize_union("SINDPD SP - SIND. TRAB. EM PROC DADOS", &rules), "São Paulo");
/// assert_eq!(normalize_union(" SINDICATO_BANCARIOS ", &rules), "SINDICATO_BANCARIOS");
/// ```
pub fn normalize_union(raw: &str, rules: &[UnionAlias]) -> String {
    canonical_union(raw, rules)
        .map(str::to_string)
        .unwrap_or_else(|| raw.trim().to_string())
}
