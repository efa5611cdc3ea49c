use ap_core::Product;
use rand::seq::index::sample;
use rand::Rng;
use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::warn;

pub const MAX_INSERTIONS: usize = 3;

/// Inserts up to three promotional blocks between the lines of `content_html`.
pub fn inject<R: Rng + ?Sized>(content_html: &str, products: &[Product], rng: &mut R) -> String {
    inject_with_limit(content_html, products, MAX_INSERTIONS, rng)
}

/// Places `min(limit, products.len())` blocks at distinct random line
/// boundaries, never ahead of the first line. Products are used in order,
/// one per insertion point, lowest point first.
pub fn inject_with_limit<R: Rng + ?Sized>(
    content_html: &str,
    products: &[Product],
    limit: usize,
    rng: &mut R,
) -> String {
    if products.is_empty() {
        warn!("⚠️ No affiliate products available, content left unchanged");
        return content_html.to_string();
    }

    let fragments: Vec<&str> = if content_html.is_empty() {
        Vec::new()
    } else {
        content_html.split('\n').collect()
    };
    let wanted = limit.min(products.len());

    // Prefer gaps between lines; the slot after the last line is only
    // used when there are not enough of them.
    let gaps = if fragments.len() > wanted {
        fragments.len() - 1
    } else {
        fragments.len()
    };
    let mut slots = sample(rng, gaps, wanted.min(gaps)).into_vec();
    slots.sort_unstable();

    let mut blocks = products.iter().take(wanted).map(promo_block);
    let mut slots = slots.into_iter().peekable();
    let mut output = Vec::with_capacity(fragments.len() + wanted);

    for (index, fragment) in fragments.iter().enumerate() {
        output.push(fragment.to_string());
        if slots.peek() == Some(&index) {
            slots.next();
            if let Some(block) = blocks.next() {
                output.push(block);
            }
        }
    }
    // Short content: whatever is left goes to the end.
    output.extend(blocks);

    output.join("\n")
}

fn promo_block(product: &Product) -> String {
    format!(
        r#"<div class="affiliate-box"><p><strong>Recommended:</strong> <a href="{}" target="_blank" rel="nofollow sponsored noopener">{}</a></p></div>"#,
        encode_double_quoted_attribute(&product.url),
        encode_text(&product.name)
    )
}
