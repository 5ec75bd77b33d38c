// ABOUTME: Output conversion for extracted chapter markup.
// ABOUTME: Sanitized HTML, plain text with <br> treated as newline, and paragraph splitting.

//! Output format conversion.
//!
//! Chapter content is extracted as raw site markup (`@html` rules); these
//! helpers turn it into something a host can render: a sanitized HTML
//! fragment, a plain-text rendition, or a list of trimmed paragraphs.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

static BR_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?\s*>").unwrap());
static MULTI_NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());
static HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());

/// Sanitize a chapter-content HTML fragment.
///
/// Novel pages wrap text in little more than containers and breaks; the
/// policy keeps text-level structure and images and drops everything else
/// (scripts, styles, event handlers, embedded ads markup).
pub fn sanitize_html(html: &str) -> String {
    let allowed_tags = [
        "p", "br", "strong", "b", "em", "i", "u", "h1", "h2", "h3", "ul", "ol", "li",
        "blockquote", "img", "a", "span", "div",
    ];

    let mut builder = ammonia::Builder::new();
    builder.tags(allowed_tags.iter().copied().collect());
    builder.add_tag_attributes("a", &["href"]);
    builder.add_tag_attributes("img", &["src", "alt"]);
    builder.add_tag_attributes("div", &["class", "id"]);
    builder.add_tag_attributes("span", &["class", "id"]);
    builder.add_tag_attributes("p", &["class"]);

    builder
        .url_schemes(["http", "https"].iter().copied().collect())
        .clean(html)
        .to_string()
}

/// Convert a chapter-content HTML fragment to plain text.
///
/// Treats `<br>` and paragraph boundaries as newlines, collapses runs of
/// blank lines to one, and trims the result.
pub fn html_to_text(html: &str) -> String {
    // <br> carries line structure on these sites; make it explicit before
    // parsing drops the tags.
    let preprocessed = BR_TAG.replace_all(html, "\n");
    // Paragraph closes also separate lines.
    let preprocessed = preprocessed.replace("</p>", "</p>\n");

    let document = Html::parse_document(&preprocessed);
    let raw_text: String = document.root_element().text().collect::<Vec<_>>().join(" ");

    let normalized = HORIZONTAL_WS.replace_all(&raw_text, " ");
    let collapsed = MULTI_NEWLINE.replace_all(&normalized, "\n");
    collapsed.trim().to_string()
}

/// Split chapter text into non-empty trimmed paragraphs.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
