// ABOUTME: Per-page chapter-content extraction: content fragment, title, next-page URL.
// ABOUTME: Pure over one parsed document; the paginated fetch loop lives in the client.

use scraper::Html;

use crate::extractors::select::resolve_expr;
use crate::rules::CompiledContent;

/// The pieces one chapter page contributes to an assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ContentPage {
    pub content: String,
    pub title: String,
    /// Raw (possibly relative) next-page link; empty when the chain ends.
    pub next_url: String,
}

/// Extract the content fragment, title and next-page link from one page.
pub(crate) fn extract_content_page(doc: &Html, rule: &CompiledContent) -> ContentPage {
    let root = doc.root_element();
    ContentPage {
        content: resolve_expr(root, rule.content.as_ref()),
        title: resolve_expr(root, rule.title.as_ref()),
        next_url: resolve_expr(root, rule.next_url.as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;

    const PAGE_HTML: &str = r#"
        <html><body>
            <h1 id="_bqgmb_h1">第一章 起点</h1>
            <div id="nr1"><p>正文第一段。</p><p>正文第二段。</p></div>
            <a id="pt_next" href="/c/1_2.html">下一页</a>
        </body></html>
    "#;

    fn content_rule() -> CompiledContent {
        RuleSet::from_json(
            r#"{"ruleContent":{
                "content":"id.nr1@html",
                "title":"id._bqgmb_h1@text",
                "nextContentUrl":"id.pt_next@href"
            }}"#,
        )
        .unwrap()
        .compile()
        .content
        .unwrap()
    }

    #[test]
    fn extracts_all_three_pieces() {
        let doc = Html::parse_document(PAGE_HTML);
        let page = extract_content_page(&doc, &content_rule());
        assert!(page.content.contains("正文第一段。"));
        assert!(page.content.starts_with("<div id=\"nr1\">"));
        assert_eq!(page.title, "第一章 起点");
        assert_eq!(page.next_url, "/c/1_2.html");
    }

    #[test]
    fn missing_next_link_ends_the_chain() {
        let html = r#"<html><body><div id="nr1">text</div></body></html>"#;
        let doc = Html::parse_document(html);
        let page = extract_content_page(&doc, &content_rule());
        assert_eq!(page.next_url, "");
        assert_eq!(page.title, "");
    }
}
