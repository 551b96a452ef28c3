use std::collections::BTreeSet;

/// Trim and lower-case a kind/genre label or a keyword.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Case-folded search text, or `None` when nothing is left after trimming.
pub fn fold_query(query: &str) -> Option<String> {
    let folded = normalize_label(query);
    if folded.is_empty() {
        None
    } else {
        Some(folded)
    }
}

/// Normalized, de-duplicated and sorted keywords. Blank entries are dropped.
pub fn normalize_keywords<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|keyword| normalize_label(keyword.as_ref()))
        .filter(|keyword| !keyword.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
