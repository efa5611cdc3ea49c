use ap_core::PublishedPost;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::html::text_of;

/// Token the article prompt asks the model to leave where related posts go.
pub const INTERNAL_LINKS_PLACEHOLDER: &str = "{{INTERNAL_LINKS}}";

pub fn post_anchor(post: &PublishedPost) -> String {
    format!(
        r#"<a href="{}">{}</a>"#,
        encode_double_quoted_attribute(&post.link),
        encode_text(&text_of(&post.title))
    )
}

/// Related-posts block as a single line, or an empty string for no links.
pub fn related_posts_block(anchors: &[String]) -> String {
    if anchors.is_empty() {
        return String::new();
    }
    let items: String = anchors.iter().map(|a| format!("<li>{}</li>", a)).collect();
    format!(
        r#"<div class="related-posts"><h3>Related Posts</h3><ul>{}</ul></div>"#,
        items
    )
}

/// Puts the related-posts block where the placeholder sits, or after the last
/// line when the model dropped it. With no anchors the placeholder is removed.
pub fn apply_internal_links(html_body: &str, anchors: &[String]) -> String {
    let block = related_posts_block(anchors);
    let wrapped = format!("<p>{}</p>", INTERNAL_LINKS_PLACEHOLDER);

    let mut found = false;
    let lines: Vec<String> = html_body
        .split('\n')
        .filter_map(|line| {
            if line.trim() == wrapped || line.trim() == INTERNAL_LINKS_PLACEHOLDER {
                found = true;
                return if block.is_empty() { None } else { Some(block.clone()) };
            }
            if line.contains(INTERNAL_LINKS_PLACEHOLDER) {
                found = true;
                return Some(line.replace(INTERNAL_LINKS_PLACEHOLDER, ""));
            }
            Some(line.to_string())
        })
        .collect();

    let mut body = lines.join("\n");
    if !found && !block.is_empty() {
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str(&block);
    }
    body
}
