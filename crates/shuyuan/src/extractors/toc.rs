// ABOUTME: Table-of-contents extraction with marked-section or rule-list chapter container choice.
// ABOUTME: The marked strategy picks the container preceded by a sibling whose text equals the marker.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::extractors::expr::NodeSelector;
use crate::extractors::select::{normalize_whitespace, resolve_expr, select_nodes};
use crate::result::ChapterRef;
use crate::rules::CompiledToc;
use crate::urls;

static LIST_ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("li").unwrap());

/// How the chapter container is located on a toc page.
///
/// Sites that interleave a "latest chapters" teaser with the full list mark
/// the real one with a short heading just before it; the marked strategy
/// keys on that. The plain strategy trusts the rule's `chapterList`
/// selector as-is.
#[derive(Debug, Clone)]
pub(crate) enum TocScope {
    /// Use the rule's `chapterList` node-set directly.
    RuleList,
    /// Choose among `container` matches the one immediately preceded by a
    /// sibling element whose text equals `marker`; fall back to the first
    /// match when none is marked.
    Marked {
        container: NodeSelector,
        marker: String,
    },
}

/// Extract chapter references from a toc page. Chapter URLs are resolved
/// against `base`.
pub(crate) fn extract_toc(
    doc: &Html,
    rule: &CompiledToc,
    scope: &TocScope,
    base: &str,
) -> Vec<ChapterRef> {
    let items: Vec<ElementRef<'_>> = match scope {
        TocScope::RuleList => select_nodes(doc.root_element(), rule.list.as_ref()),
        TocScope::Marked { container, marker } => {
            let containers = select_nodes(doc.root_element(), Some(container));
            let chosen = containers
                .iter()
                .copied()
                .find(|c| marker_precedes(*c, marker))
                .or_else(|| containers.first().copied());
            match chosen {
                Some(block) => block.select(&LIST_ITEM).collect(),
                None => Vec::new(),
            }
        }
    };

    items
        .into_iter()
        .map(|item| ChapterRef {
            name: resolve_expr(item, Some(&rule.name)),
            url: urls::resolve(base, &resolve_expr(item, Some(&rule.url))),
        })
        .collect()
}

/// True if the element's nearest preceding sibling element has exactly the
/// marker as its text.
fn marker_precedes(el: ElementRef<'_>, marker: &str) -> bool {
    el.prev_siblings()
        .find_map(ElementRef::wrap)
        .map(|prev| normalize_whitespace(&prev.text().collect::<String>()) == marker)
        .unwrap_or(false)
}
