use crate::html::text_of;

pub const SEO_TITLE_MAX: usize = 60;
pub const META_DESCRIPTION_MAX: usize = 155;
const FOCUS_KEYWORD_WORDS: usize = 3;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "best", "by", "for", "from", "guide", "how", "in", "is",
    "it", "of", "on", "or", "the", "this", "tips", "to", "top", "ultimate", "what", "when",
    "why", "with", "your", "you",
];

/// Cuts `text` to at most `max` characters without splitting a word.
pub fn truncate_words(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }

    let mut out = String::new();
    for word in text.split_whitespace() {
        let needed = if out.is_empty() {
            word.chars().count()
        } else {
            out.chars().count() + 1 + word.chars().count()
        };
        if needed > max {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }

    if out.is_empty() {
        // a single word longer than the limit
        return text.chars().take(max).collect();
    }
    out.trim_end_matches(|c: char| c == ',' || c == ';' || c == ':' || c == '-').to_string()
}

pub fn seo_title(title: &str) -> String {
    truncate_words(title, SEO_TITLE_MAX)
}

/// Uses the model-provided description when there is one, otherwise the
/// first sentence of the body.
pub fn meta_description(explicit: Option<&str>, html_body: &str) -> String {
    let source = match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(description) => description.to_string(),
        None => first_sentence(&text_of(html_body)),
    };
    truncate_words(&source, META_DESCRIPTION_MAX)
}

/// First three significant words of the title, lowercased.
pub fn focus_keyword(title: &str) -> String {
    title
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(&w.as_str()))
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .take(FOCUS_KEYWORD_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_sentence(text: &str) -> String {
    match text.find(|c| c == '.' || c == '!' || c == '?') {
        Some(end) => text[..=end].trim().to_string(),
        None => text.trim().to_string(),
    }
}
