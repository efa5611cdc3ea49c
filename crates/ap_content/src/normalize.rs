use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"(?i)\[(?:head|body|meta|title)\]").unwrap();
    static ref HEADING: Regex = Regex::new(r"^(#{1,6})(?:\s+(.*))?$").unwrap();
    static ref MD_LINK: Regex = Regex::new(r"\[([^\[\]]+)\]\(([^\s)]+)\)").unwrap();
    static ref BOLD: Regex = Regex::new(r"\*\*([^*]+)\*\*").unwrap();
    static ref BLOCK_START: Regex =
        Regex::new(r"(?i)^<(?:h[1-6]|p|div|ul|ol|table|blockquote|figure|section)[\s>]").unwrap();
    static ref EMPTY_PARAGRAPH: Regex = Regex::new(r"<p>\s*</p>").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Turns loosely structured model output into a flat run of block elements,
/// one per line.
///
/// Lines that already open with a block-level tag are kept as they are, so
/// running this on its own output changes nothing.
pub fn normalize(raw_text: &str) -> String {
    let mut text = raw_text.to_string();
    // Removing one token can splice its neighbours into a new one.
    while PLACEHOLDER.is_match(&text) {
        text = PLACEHOLDER.replace_all(&text, "").into_owned();
    }

    let text = MD_LINK.replace_all(&text, r#"<a href="$2">$1</a>"#);
    let text = BOLD.replace_all(&text, "<strong>$1</strong>");

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(to_block)
        .map(|block| WHITESPACE.replace_all(&block, " ").into_owned())
        .filter(|block| !EMPTY_PARAGRAPH.is_match(block))
        .collect::<Vec<_>>()
        .join("\n")
}

fn to_block(line: &str) -> Option<String> {
    if BLOCK_START.is_match(line) {
        return Some(line.to_string());
    }

    if let Some(caps) = HEADING.captures(line) {
        let level = caps[1].len().min(3);
        let heading = caps
            .get(2)
            .map_or("", |m| m.as_str())
            .trim()
            .trim_end_matches('#')
            .trim();
        if heading.is_empty() {
            return None;
        }
        return Some(format!("<h{level}>{heading}</h{level}>"));
    }

    Some(format!("<p>{}</p>", line))
}
