//! HTML body-text extraction.
//!
//! CPU-bound; the extractor dispatches this off the async scheduler via
//! `spawn_blocking`.

use scraper::{Html, Selector};

/// Paragraph runs shorter than this are ignored inside the main container
/// before falling back to a whole-document sweep.
const MIN_CONTAINER_TEXT: usize = 200;

/// Extract readable body text from an article page.
///
/// Looks for the main content container first, then falls back to every
/// paragraph in the document. Returns None when nothing textual survives.
pub fn extract_text(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let paragraph = Selector::parse("p").ok()?;

    for container_selector in ["article", "main", "[role=main]", "[itemprop=articleBody]"] {
        let Ok(selector) = Selector::parse(container_selector) else {
            continue;
        };
        if let Some(container) = doc.select(&selector).next() {
            let text = join_paragraphs(container.select(&paragraph));
            if text.chars().count() >= MIN_CONTAINER_TEXT {
                return Some(text);
            }
        }
    }

    let text = join_paragraphs(doc.select(&paragraph));
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn join_paragraphs<'a>(paragraphs: impl Iterator<Item = scraper::ElementRef<'a>>) -> String {
    let mut parts = Vec::new();
    for p in paragraphs {
        let text = p.text().collect::<String>();
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !text.is_empty() {
            parts.push(text);
        }
    }
    parts.join("\n\n")
}
