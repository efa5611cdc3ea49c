/// Lowercases, transliterates to ASCII and joins the words with single
/// hyphens. Punctuation inside a word is dropped, so "Don't" gives `dont`.
pub fn slugify(title: &str) -> String {
    let words: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '_' | '/'))
        .collect();
    ::slug::slugify(words)
}
