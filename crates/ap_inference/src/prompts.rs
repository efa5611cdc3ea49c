use ap_content::INTERNAL_LINKS_PLACEHOLDER;
use ap_core::Topic;

/// Characters of article text sent along with the product prompt.
pub const PRODUCT_EXCERPT_CHARS: usize = 1500;

pub const PRODUCT_INSTRUCTION: &str =
    "Suggest 3 to 5 specific products a reader of this article might buy. \
     Reply with the product names only, each wrapped in double quotes.";

pub const TOPIC_INSTRUCTION: &str = "Propose one new blog post title";

pub fn article_prompt(topic: &Topic) -> String {
    format!(
        "Write an in-depth, practical blog article.\n\
         Topic: {topic}\n\n\
         Format the reply exactly like this:\n\
         [TITLE] a catchy title\n\
         [META] a meta description under 155 characters\n\
         [BODY]\n\
         the article in markdown, using ## and ### headings, 900 to 1300 words,\n\
         with a line containing only {placeholder} right before the conclusion.",
        topic = topic.text,
        placeholder = INTERNAL_LINKS_PLACEHOLDER,
    )
}

pub fn product_prompt(excerpt: &str) -> String {
    format!("{}\n\nArticle:\n{}", PRODUCT_INSTRUCTION, excerpt)
}

pub fn topic_prompt(niche: &str, avoid: &[String]) -> String {
    let mut prompt = format!(
        "{} for a blog about {}. Reply with the title only.",
        TOPIC_INSTRUCTION, niche
    );
    if !avoid.is_empty() {
        prompt.push_str("\nDo not repeat any of these:\n");
        for topic in avoid.iter().rev().take(20) {
            prompt.push_str("- ");
            prompt.push_str(topic);
            prompt.push('\n');
        }
    }
    prompt
}

/// First `max_chars` characters, cut on a char boundary.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("héllo wörld", 4), "héll");
        assert_eq!(excerpt("short", 100), "short");
        assert_eq!(excerpt("", 3), "");
    }

    #[test]
    fn test_article_prompt_mentions_topic_and_placeholder() {
        let prompt = article_prompt(&Topic::new("Duck calls"));
        assert!(prompt.contains("Topic: Duck calls"));
        assert!(prompt.contains(INTERNAL_LINKS_PLACEHOLDER));
        assert!(prompt.contains("[BODY]"));
    }

    #[test]
    fn test_topic_prompt_lists_recent_topics() {
        let prompt = topic_prompt("fishing", &["Old one".to_string()]);
        assert!(prompt.starts_with(TOPIC_INSTRUCTION));
        assert!(prompt.contains("- Old one"));
    }
}
