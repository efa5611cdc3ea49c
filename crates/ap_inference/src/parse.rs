use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref QUOTED: Regex =
        Regex::new("[\"\u{201c}]([^\"\u{201c}\u{201d}\n]{2,100})[\"\u{201d}]").unwrap();
    static ref MARKER: Regex =
        Regex::new(r"(?i)^\s*(?:\[(title|head|meta|body)\]|(title|meta description|meta)\s*:)\s*(.*)$")
            .unwrap();
    static ref H1: Regex = Regex::new(r"^\s*#\s+(.+)$").unwrap();
}

/// Quoted substrings of a model reply, de-duplicated, in order of appearance.
pub fn extract_quoted(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in QUOTED.captures_iter(raw) {
        let name = caps[1].trim();
        if name.is_empty() || names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            continue;
        }
        names.push(name.to_string());
    }
    names
}

/// Pieces of a generated article reply. Missing parts stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArticle {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub body: String,
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Title,
    Meta,
}

/// Best-effort split of a `[TITLE]` / `[META]` / `[BODY]` reply.
///
/// Without a `[BODY]` marker every line that is not a title or meta line is
/// body. Without a title the first `# ` heading is promoted and dropped from
/// the body.
pub fn parse_article_response(raw: &str) -> ParsedArticle {
    let mut parsed = ParsedArticle::default();
    let mut body_lines: Vec<&str> = Vec::new();
    let mut in_body = false;
    let mut pending: Option<Field> = None;

    for line in raw.lines() {
        if in_body {
            body_lines.push(line);
            continue;
        }

        if let Some(caps) = MARKER.captures(line) {
            let key = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_lowercase())
                .unwrap_or_default();
            let rest = caps.get(3).map_or("", |m| m.as_str()).trim();

            let field = match key.as_str() {
                "title" | "head" => Some(Field::Title),
                "body" => {
                    in_body = true;
                    if !rest.is_empty() {
                        body_lines.push(rest);
                    }
                    None
                }
                _ => Some(Field::Meta),
            };

            if let Some(field) = field {
                if rest.is_empty() {
                    pending = Some(field);
                } else {
                    set_field(&mut parsed, field, rest);
                }
            }
            continue;
        }

        if let Some(field) = pending {
            if line.trim().is_empty() {
                continue;
            }
            set_field(&mut parsed, field, line);
            pending = None;
            continue;
        }

        body_lines.push(line);
    }

    if parsed.title.is_none() {
        if let Some(index) = body_lines.iter().position(|l| H1.is_match(l)) {
            let heading = H1.captures(body_lines[index]).map(|c| c[1].to_string());
            parsed.title = heading.map(|h| clean_inline(&h)).filter(|h| !h.is_empty());
            body_lines.remove(index);
        }
    }

    parsed.body = body_lines.join("\n").trim().to_string();
    parsed
}

fn set_field(parsed: &mut ParsedArticle, field: Field, value: &str) {
    let value = clean_inline(value);
    if value.is_empty() {
        return;
    }
    match field {
        Field::Title => parsed.title = Some(value),
        Field::Meta => parsed.meta_description = Some(value),
    }
}

fn clean_inline(value: &str) -> String {
    value
        .trim()
        .trim_start_matches('#')
        .trim()
        .trim_matches('*')
        .trim_matches(|c: char| c == '"' || c == '\u{201c}' || c == '\u{201d}')
        .trim()
        .to_string()
}
