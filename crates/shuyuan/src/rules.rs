// ABOUTME: Book-source rule set data model and the embedded default rules loader.
// ABOUTME: Raw serde structs mirror the external JSON; compile() pre-parses every selector expression.

//! Book-source rule sets.
//!
//! A rule set is a JSON object mapping rule-group names (`ruleSearch`,
//! `ruleToc`, `ruleContent`, `ruleBookInfo`, `ruleFind`) to field-name ->
//! selector-expression mappings. It is supplied externally (config file or
//! the embedded default) and never mutated by the engine.
//!
//! [`RuleSet::compile`] turns the raw strings into pre-parsed
//! [`SelectorExpr`](crate::extractors::expr::SelectorExpr) values once, so
//! evaluation never re-parses expressions. Compilation is best-effort: an
//! invalid selector or regex degrades that single field with a warn log.
//! Anything stricter is the caller's concern.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::extractors::expr::{NodeSelector, SelectorExpr};

/// Embedded default rule set for the default site.
const DEFAULT_RULES_JSON: &str = include_str!("../data/default_rules.json");

/// A full book-source rule set, one optional group per operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleSet {
    pub rule_search: Option<SearchRule>,
    pub rule_toc: Option<TocRule>,
    pub rule_content: Option<ContentRule>,
    pub rule_book_info: Option<HashMap<String, String>>,
    pub rule_find: Option<FindRule>,
}

/// Selectors for search-result (and category-listing) pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRule {
    pub book_list: Option<String>,
    pub name: Option<String>,
    pub author: Option<String>,
    pub intro: Option<String>,
    pub book_url: Option<String>,
    pub cover_url: Option<String>,
}

/// Selectors for table-of-contents pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TocRule {
    pub chapter_list: Option<String>,
    pub chapter_name: Option<String>,
    pub chapter_url: Option<String>,
}

/// Selectors for chapter-content pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentRule {
    pub content: Option<String>,
    pub title: Option<String>,
    pub next_content_url: Option<String>,
    pub replace_regex: Option<String>,
}

/// Selectors for category ("find") pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FindRule {
    pub find_list: Option<String>,
    pub find_name: Option<String>,
    pub find_url: Option<String>,
}

/// Load the embedded default rule set.
///
/// # Panics
///
/// Panics if the embedded JSON is malformed.
pub fn default_rules() -> RuleSet {
    serde_json::from_str(DEFAULT_RULES_JSON).expect("failed to parse embedded default rules")
}

impl RuleSet {
    /// Parse a rule set from external JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Pre-parse every selector expression in this rule set.
    pub(crate) fn compile(&self) -> CompiledRules {
        CompiledRules {
            search: self.rule_search.as_ref().map(|r| CompiledSearch {
                list: r.book_list.as_deref().map(NodeSelector::parse),
                name: parse_opt(&r.name),
                author: parse_opt(&r.author),
                intro: parse_opt(&r.intro),
                book_url: parse_opt(&r.book_url),
                cover_url: parse_opt(&r.cover_url),
            }),
            toc: {
                let rule = self.rule_toc.clone().unwrap_or_default();
                CompiledToc {
                    list: rule.chapter_list.as_deref().map(NodeSelector::parse),
                    name: SelectorExpr::parse(rule.chapter_name.as_deref().unwrap_or("a@text")),
                    url: SelectorExpr::parse(rule.chapter_url.as_deref().unwrap_or("a@href")),
                }
            },
            content: self.rule_content.as_ref().map(|r| CompiledContent {
                content: parse_opt(&r.content),
                title: parse_opt(&r.title),
                next_url: parse_opt(&r.next_content_url),
                replace: r.replace_regex.as_deref().and_then(compile_replace),
            }),
            book_info: self
                .rule_book_info
                .as_ref()
                .map(|fields| {
                    fields
                        .iter()
                        .map(|(name, expr)| (name.clone(), SelectorExpr::parse(expr)))
                        .collect()
                })
                .unwrap_or_default(),
            find: self.rule_find.as_ref().map(|r| CompiledFind {
                list: r.find_list.as_deref().map(NodeSelector::parse),
                name: parse_opt(&r.find_name),
                url: parse_opt(&r.find_url),
            }),
        }
    }
}

fn parse_opt(expr: &Option<String>) -> Option<SelectorExpr> {
    expr.as_deref().map(SelectorExpr::parse)
}

fn compile_replace(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(pattern, error = %e, "invalid replaceRegex in rule");
            None
        }
    }
}

/// A rule set with every selector expression parsed ahead of evaluation.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRules {
    pub search: Option<CompiledSearch>,
    pub toc: CompiledToc,
    pub content: Option<CompiledContent>,
    pub book_info: Vec<(String, SelectorExpr)>,
    pub find: Option<CompiledFind>,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledSearch {
    pub list: Option<NodeSelector>,
    pub name: Option<SelectorExpr>,
    pub author: Option<SelectorExpr>,
    pub intro: Option<SelectorExpr>,
    pub book_url: Option<SelectorExpr>,
    pub cover_url: Option<SelectorExpr>,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledToc {
    pub list: Option<NodeSelector>,
    pub name: SelectorExpr,
    pub url: SelectorExpr,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledContent {
    pub content: Option<SelectorExpr>,
    pub title: Option<SelectorExpr>,
    pub next_url: Option<SelectorExpr>,
    pub replace: Option<Regex>,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledFind {
    pub list: Option<NodeSelector>,
    pub name: Option<SelectorExpr>,
    pub url: Option<SelectorExpr>,
}
