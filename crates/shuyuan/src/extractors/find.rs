// ABOUTME: Category ("find") page extraction: findList node-set to CategoryRef records.

use scraper::Html;

use crate::extractors::select::{resolve_expr, select_nodes};
use crate::result::CategoryRef;
use crate::rules::CompiledFind;
use crate::urls;

/// Extract category references from a discovery page. URLs are resolved
/// against `base`.
pub(crate) fn extract_find(doc: &Html, rule: &CompiledFind, base: &str) -> Vec<CategoryRef> {
    select_nodes(doc.root_element(), rule.list.as_ref())
        .into_iter()
        .map(|item| CategoryRef {
            name: resolve_expr(item, rule.name.as_ref()),
            url: urls::resolve(base, &resolve_expr(item, rule.url.as_ref())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;

    #[test]
    fn extracts_name_url_pairs() {
        let compiled = RuleSet::from_json(
            r#"{"ruleFind":{"findList":".content li","findName":"a@text","findUrl":"a@href"}}"#,
        )
        .unwrap()
        .compile();

        let html = r#"
            <html><body><div class="content">
                <li><a href="/sort/1.html">玄幻</a></li>
                <li><a href="/sort/2.html">都市</a></li>
            </div></body></html>
        "#;
        let doc = Html::parse_document(html);
        let categories = extract_find(&doc, compiled.find.as_ref().unwrap(), "http://s.com");

        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "玄幻");
        assert_eq!(categories[0].url, "http://s.com/sort/1.html");
        assert_eq!(categories[1].url, "http://s.com/sort/2.html");
    }

    #[test]
    fn missing_find_list_yields_no_records() {
        let compiled = RuleSet::from_json(r#"{"ruleFind":{"findName":"a@text"}}"#)
            .unwrap()
            .compile();
        let doc = Html::parse_document("<html><body><li><a href='/x'>x</a></li></body></html>");
        assert!(extract_find(&doc, compiled.find.as_ref().unwrap(), "http://s.com").is_empty());
    }
}
