use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Normalize a text search value:
/// - case-insensitive
/// - accent/diacritic-insensitive (strip combining marks)
/// - surrounding whitespace trimmed, inner whitespace collapsed
///
/// Punctuation is kept so wildcards and phrase characters survive.
pub fn normalize_text_value(input: &str) -> String {
    let folded: String = input
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(|c| c.to_lowercase())
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip surrounding whitespace and double quotes from a keyword value.
pub fn normalize_keyword_value(input: &str) -> String {
    input.trim().trim_matches('"').trim().to_string()
}
