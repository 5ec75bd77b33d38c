// ABOUTME: Search-result extraction: bookList node-set to BookListing records.
// ABOUTME: Also provides the {{key}} substitution applied to search URL templates.

use scraper::Html;

use crate::extractors::select::{resolve_expr, select_nodes};
use crate::result::BookListing;
use crate::rules::CompiledSearch;
use crate::urls;

/// Substitute the caller-supplied search key into a URL template.
pub fn substitute_key(url_template: &str, key: &str) -> String {
    url_template.replace("{{key}}", key)
}

/// Extract book listings from a search-result (or category-listing) page.
///
/// Book and cover URLs are resolved against `base`. A page without the
/// `bookList` node-set yields an empty vec.
pub(crate) fn extract_search(doc: &Html, rule: &CompiledSearch, base: &str) -> Vec<BookListing> {
    select_nodes(doc.root_element(), rule.list.as_ref())
        .into_iter()
        .map(|item| BookListing {
            name: resolve_expr(item, rule.name.as_ref()),
            author: resolve_expr(item, rule.author.as_ref()),
            intro: resolve_expr(item, rule.intro.as_ref()),
            book_url: urls::resolve(base, &resolve_expr(item, rule.book_url.as_ref())),
            cover_url: urls::resolve(base, &resolve_expr(item, rule.cover_url.as_ref())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;

    const LISTING_HTML: &str = r#"
        <html><body>
            <div class="item">
                <h2>Title A</h2>
                <a href="/b/1">x</a>
                <img src="/cover/1.jpg">
                <p class="intro">An intro.</p>
            </div>
            <div class="item">
                <h2>Title B</h2>
                <a href="http://other.com/b/2">y</a>
            </div>
        </body></html>
    "#;

    fn compile(json: &str) -> crate::rules::CompiledRules {
        RuleSet::from_json(json).unwrap().compile()
    }

    #[test]
    fn extracts_records_and_resolves_urls() {
        let compiled = compile(
            r#"{"ruleSearch":{
                "bookList":".item",
                "name":"h2@text",
                "intro":"p.intro@text",
                "bookUrl":"a@href",
                "coverUrl":"img@src"
            }}"#,
        );
        let doc = Html::parse_document(LISTING_HTML);
        let books = extract_search(&doc, compiled.search.as_ref().unwrap(), "http://s.com");

        assert_eq!(books.len(), 2);
        assert_eq!(books[0].name, "Title A");
        assert_eq!(books[0].intro, "An intro.");
        assert_eq!(books[0].book_url, "http://s.com/b/1");
        assert_eq!(books[0].cover_url, "http://s.com/cover/1.jpg");
        // Absolute URLs pass through untouched; missing fields stay empty.
        assert_eq!(books[1].book_url, "http://other.com/b/2");
        assert_eq!(books[1].intro, "");
        assert_eq!(books[1].cover_url, "");
    }

    #[test]
    fn missing_book_list_yields_no_records() {
        let compiled = compile(r#"{"ruleSearch":{"name":"h2@text"}}"#);
        let doc = Html::parse_document(LISTING_HTML);
        let books = extract_search(&doc, compiled.search.as_ref().unwrap(), "http://s.com");
        assert!(books.is_empty());
    }

    #[test]
    fn key_substitution_replaces_placeholder() {
        assert_eq!(
            substitute_key("http://s.com/search?q={{key}}", "诡秘"),
            "http://s.com/search?q=诡秘"
        );
        assert_eq!(substitute_key("http://s.com/search", "k"), "http://s.com/search");
    }
}
