// ABOUTME: Main library entry point for the shuyuan book-source extraction engine.
// ABOUTME: Re-exports the public API: Client, ClientBuilder, Options, RuleSet, records, ParseError.

//! shuyuan - a rule-driven extraction engine for novel sites.
//!
//! A book-source rule set (a small JSON object of CSS-like selector
//! expressions) plus a site base URL turn one target site into structured
//! data: category lists, book listings, tables of contents and stitched
//! chapter content. The engine fetches with spoofed browser headers, a
//! jittered courtesy delay and bounded retry, and every operation degrades
//! to an empty result instead of raising.
//!
//! # Example
//!
//! ```no_run
//! use shuyuan::Client;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Client::builder()
//!         .site_url("http://3g.shugelou.org")
//!         .build();
//!     let chapters = client.toc("http://3g.shugelou.org/book/1/").await;
//!     if let Some(first) = chapters.first() {
//!         let chapter = client.content(&first.url).await;
//!         println!("{}\n{}", chapter.title, chapter.content);
//!     }
//! }
//! ```

pub mod client;
pub mod error;
pub mod extractors;
pub mod fetch;
pub mod formats;
pub mod options;
pub mod result;
pub mod rules;
pub mod urls;

pub use crate::client::Client;
pub use crate::error::{ErrorCode, ParseError};
pub use crate::extractors::expr::{ExtractKind, NodeSelector, SelectorExpr};
pub use crate::extractors::search::substitute_key;
pub use crate::fetch::DEFAULT_USER_AGENT;
pub use crate::options::{ClientBuilder, Options, TocSection};
pub use crate::result::{BookInfo, BookListing, CategoryRef, ChapterContent, ChapterRef};
pub use crate::rules::{default_rules, ContentRule, FindRule, RuleSet, SearchRule, TocRule};
