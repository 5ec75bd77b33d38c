// ABOUTME: Parser for the book-source selector expression mini-DSL.
// ABOUTME: Compiles `sel@type##regex` strings into SelectorExpr values once, at rule load.

//! Selector expression parsing.
//!
//! A selector expression is a string of the form `SEL[@TYPE][##REGEX]`:
//! - `SEL` is a CSS selector, optionally using the shorthand `id.X` (-> `#X`)
//!   or `class.X` (-> `.X`), and optionally carrying a `:contains('LIT')`
//!   pseudo-filter that is not native CSS;
//! - `TYPE` is `text` (default), `html`, or an attribute name;
//! - `REGEX` is stripped globally from the extracted value.
//!
//! Expressions are parsed here exactly once, when a rule set is compiled; the
//! resulting [`SelectorExpr`] is evaluated in [`super::select`]. Only the
//! first `##` splits the expression, so a single regex-strip stage is
//! supported per expression. Parsing is best-effort: an invalid CSS selector
//! or regex degrades to a never-matching expression with a warn log, it never
//! fails the caller.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;
use tracing::warn;

/// What to extract from the first node matched by a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractKind {
    /// Whitespace-normalized visible text.
    Text,
    /// Serialized outer HTML.
    Html,
    /// A named attribute's value, trimmed.
    Attr(String),
}

/// A parsed selector expression, ready for repeated evaluation.
#[derive(Debug, Clone)]
pub struct SelectorExpr {
    /// The original expression string, kept for diagnostics.
    pub raw: String,
    /// Compiled CSS selector; `None` when the expression was empty or invalid.
    pub selector: Option<Selector>,
    /// Substring filter from a `:contains(..)` clause, case-sensitive.
    pub contains: Option<String>,
    pub kind: ExtractKind,
    /// Global strip pattern from the `##` suffix.
    pub strip: Option<Regex>,
}

/// A parsed node-set selector (the `bookList`/`chapterList`/`findList` slot).
///
/// Same shorthand and `:contains` handling as [`SelectorExpr`], but it yields
/// every matching node and carries no extraction type or strip stage.
#[derive(Debug, Clone)]
pub struct NodeSelector {
    pub raw: String,
    pub selector: Option<Selector>,
    pub contains: Option<String>,
}

static CONTAINS_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#":contains\(\s*(?:'([^']*)'|"([^"]*)"|([^)'"]*?))\s*\)"#).unwrap()
});

impl SelectorExpr {
    /// Parse one selector expression.
    pub fn parse(expr: &str) -> Self {
        let (base, strip) = match expr.split_once("##") {
            Some((base, pattern)) => (base, compile_strip(expr, pattern)),
            None => (expr, None),
        };

        // TYPE sits after the last `@`; attribute values inside the CSS part
        // may themselves contain `@`.
        let (sel, kind) = match base.rsplit_once('@') {
            Some((sel, typ)) => {
                let kind = match typ {
                    "" | "text" => ExtractKind::Text,
                    "html" => ExtractKind::Html,
                    attr => ExtractKind::Attr(attr.to_string()),
                };
                (sel, kind)
            }
            None => (base, ExtractKind::Text),
        };

        let (selector, contains) = compile_css(expr, sel);
        Self {
            raw: expr.to_string(),
            selector,
            contains,
            kind,
            strip,
        }
    }
}

impl NodeSelector {
    /// Parse one node-set selector.
    pub fn parse(sel: &str) -> Self {
        let (selector, contains) = compile_css(sel, sel);
        Self {
            raw: sel.to_string(),
            selector,
            contains,
        }
    }
}

/// Rewrite the `id.X`/`class.X` shorthand, split off a `:contains` clause,
/// and compile what remains as CSS.
fn compile_css(raw: &str, sel: &str) -> (Option<Selector>, Option<String>) {
    let sel = sel.trim();
    if sel.is_empty() {
        return (None, None);
    }

    let rewritten = if let Some(rest) = sel.strip_prefix("id.") {
        format!("#{}", rest)
    } else if let Some(rest) = sel.strip_prefix("class.") {
        format!(".{}", rest)
    } else {
        sel.to_string()
    };

    let mut contains = None;
    let cleaned = match CONTAINS_CLAUSE.captures(&rewritten) {
        Some(caps) => {
            let literal = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            contains = Some(literal);
            CONTAINS_CLAUSE.replace(&rewritten, "").into_owned()
        }
        None => rewritten,
    };

    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        warn!(selector = raw, "selector is only a :contains clause, ignoring");
        return (None, contains);
    }

    let result = match Selector::parse(cleaned) {
        Ok(selector) => (Some(selector), contains),
        Err(e) => {
            warn!(selector = raw, error = %e, "invalid CSS selector in rule");
            (None, contains)
        }
    };
    result
}

fn compile_strip(raw: &str, pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(selector = raw, error = %e, "invalid strip regex in rule");
            None
        }
    }
}
