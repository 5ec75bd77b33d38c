// ABOUTME: Extraction record types returned by the engine operations.
// ABOUTME: Plain serde-serializable structs; equality is field equality, no identity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One entry of a search-result or category-listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookListing {
    pub name: String,
    pub author: String,
    pub intro: String,
    pub book_url: String,
    pub cover_url: String,
}

/// One chapter reference from a table of contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRef {
    pub name: String,
    pub url: String,
}

/// One category reference from a "find" (discovery) page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub name: String,
    pub url: String,
}

/// Assembled chapter content, stitched across paginated chapter pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterContent {
    pub title: String,
    pub content: String,
}

impl ChapterContent {
    /// Returns true if neither a title nor any content was extracted.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.content.is_empty()
    }
}

/// Free-form book metadata, one entry per `ruleBookInfo` field that matched.
pub type BookInfo = HashMap<String, String>;
