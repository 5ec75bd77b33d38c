// ABOUTME: Evaluation of compiled selector expressions against HTML nodes.
// ABOUTME: First matching node wins; misses degrade to an empty string with a debug log.

//! Selector evaluation.
//!
//! Key behaviors:
//! - Evaluation scope is any element (pass `Html::root_element()` for the
//!   whole document, or a list item for per-record fields).
//! - The first node matching the CSS selector and the optional `:contains`
//!   filter wins.
//! - Text extraction normalizes whitespace; attribute extraction trims.
//! - The `##` strip regex removes every match from the extracted value.
//! - No match, an absent rule field, or a degraded selector all produce `""`.

use scraper::ElementRef;
use tracing::debug;

use crate::extractors::expr::{ExtractKind, NodeSelector, SelectorExpr};

/// Normalizes whitespace in a string by collapsing runs of whitespace into single spaces.
pub(crate) fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(el: ElementRef<'_>) -> String {
    normalize_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

fn contains_filter(el: ElementRef<'_>, literal: Option<&str>) -> bool {
    match literal {
        Some(lit) => el.text().collect::<String>().contains(lit),
        None => true,
    }
}

/// Resolve a selector expression to a string within `scope`.
///
/// `None` (absent rule field) resolves to `""`, matching the contract that a
/// missing selector is a legal no-op rather than an error.
pub(crate) fn resolve_expr(scope: ElementRef<'_>, expr: Option<&SelectorExpr>) -> String {
    let Some(expr) = expr else {
        return String::new();
    };
    let Some(selector) = expr.selector.as_ref() else {
        return String::new();
    };

    let node = scope
        .select(selector)
        .find(|el| contains_filter(*el, expr.contains.as_deref()));

    let value = match node {
        Some(el) => match &expr.kind {
            ExtractKind::Text => element_text(el),
            ExtractKind::Html => el.html(),
            ExtractKind::Attr(name) => el
                .value()
                .attr(name)
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
        },
        None => {
            debug!(selector = %expr.raw, "selector matched no nodes");
            String::new()
        }
    };

    match &expr.strip {
        Some(re) => re.replace_all(&value, "").into_owned(),
        None => value,
    }
}

/// Select every node in `scope` matching a node-set selector.
pub(crate) fn select_nodes<'a>(
    scope: ElementRef<'a>,
    sel: Option<&NodeSelector>,
) -> Vec<ElementRef<'a>> {
    let Some(sel) = sel else {
        return Vec::new();
    };
    let Some(selector) = sel.selector.as_ref() else {
        return Vec::new();
    };

    let nodes: Vec<_> = scope
        .select(selector)
        .filter(|el| contains_filter(*el, sel.contains.as_deref()))
        .collect();
    if nodes.is_empty() {
        debug!(selector = %sel.raw, "list selector matched no nodes");
    }
    nodes
}
