// ABOUTME: Book-info extraction: every ruleBookInfo field applied to the whole document.
// ABOUTME: Values are trimmed; fields that extract empty are omitted from the map.

use scraper::Html;

use crate::extractors::select::resolve_expr;
use crate::result::BookInfo;
use crate::rules::CompiledRules;

/// Extract free-form book metadata. An absent `ruleBookInfo` group yields an
/// empty map.
pub(crate) fn extract_book_info(doc: &Html, rules: &CompiledRules) -> BookInfo {
    let root = doc.root_element();
    rules
        .book_info
        .iter()
        .filter_map(|(name, expr)| {
            let value = resolve_expr(root, Some(expr));
            let value = value.trim();
            if value.is_empty() {
                None
            } else {
                Some((name.clone(), value.to_string()))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;

    const INFO_HTML: &str = r#"
        <html><body>
            <h1 class="name">某小说</h1>
            <div class="intro">  一段简介。  </div>
            <img class="cover" src="/cover.jpg">
            <span class="status"></span>
        </body></html>
    "#;

    #[test]
    fn extracts_trimmed_fields_and_omits_empty_ones() {
        let rules = RuleSet::from_json(
            r#"{"ruleBookInfo":{
                "name":"h1.name@text",
                "intro":"div.intro@text",
                "coverUrl":"img.cover@src",
                "status":"span.status@text",
                "missing":"div.none@text"
            }}"#,
        )
        .unwrap()
        .compile();

        let doc = Html::parse_document(INFO_HTML);
        let info = extract_book_info(&doc, &rules);

        assert_eq!(info.get("name").map(String::as_str), Some("某小说"));
        assert_eq!(info.get("intro").map(String::as_str), Some("一段简介。"));
        assert_eq!(info.get("coverUrl").map(String::as_str), Some("/cover.jpg"));
        assert!(!info.contains_key("status"));
        assert!(!info.contains_key("missing"));
    }

    #[test]
    fn absent_group_yields_empty_map() {
        let rules = RuleSet::from_json("{}").unwrap().compile();
        let doc = Html::parse_document(INFO_HTML);
        assert!(extract_book_info(&doc, &rules).is_empty());
    }
}
