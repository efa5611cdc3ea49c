use scraper::Html;

/// Plain text of an HTML fragment, entities decoded and whitespace collapsed.
/// Remote titles arrive as rendered HTML.
pub fn text_of(fragment: &str) -> String {
    let document = Html::parse_fragment(fragment);
    let text = document.root_element().text().collect::<String>();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
