// ABOUTME: The main engine Client: compiled rules + HTTP client + the five read operations.
// ABOUTME: Operations degrade to empty results on any failure; errors never reach the caller.

use reqwest::Method;
use scraper::Html;
use tracing::{debug, warn};

use crate::extractors::content::extract_content_page;
use crate::extractors::expr::NodeSelector;
use crate::extractors::find::extract_find;
use crate::extractors::info::extract_book_info;
use crate::extractors::search::{extract_search, substitute_key};
use crate::extractors::toc::{extract_toc, TocScope};
use crate::fetch::{fetch_text, FetchConfig};
use crate::options::{ClientBuilder, Options, TocSection};
use crate::result::{BookInfo, BookListing, CategoryRef, ChapterContent, ChapterRef};
use crate::rules::CompiledRules;
use crate::urls;

/// Hard cap on sequential next-page fetches per chapter assembly. Bounds
/// cyclic or runaway `nextContentUrl` chains.
const MAX_CONTENT_PAGES: usize = 3;

/// The rule-driven extraction client.
///
/// Holds only read-only state (compiled rules, site base, header template,
/// connection pool), so independent operations may run concurrently from
/// separate tasks.
pub struct Client {
    http: reqwest::Client,
    site_url: String,
    rules: CompiledRules,
    fetch_cfg: FetchConfig,
    toc_scope: TocScope,
}

impl Client {
    /// Create a new ClientBuilder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new Client with the given options. Rule selector expressions
    /// are compiled here, once.
    pub fn new(opts: Options) -> Self {
        let http = opts.http_client.clone().unwrap_or_else(|| {
            reqwest::Client::builder()
                .timeout(opts.timeout)
                .connect_timeout(opts.connect_timeout)
                .cookie_store(true)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .expect("failed to build HTTP client")
        });

        let fetch_cfg = FetchConfig {
            referer: opts.site_url.clone(),
            user_agent: opts.user_agent.clone(),
            headers: opts.headers.clone(),
            delay: opts.request_delay,
        };

        let toc_scope = match &opts.toc_section {
            TocSection::RuleList => TocScope::RuleList,
            TocSection::MarkedSection { container, marker } => TocScope::Marked {
                container: NodeSelector::parse(container),
                marker: marker.clone(),
            },
        };

        Self {
            http,
            site_url: opts.site_url.clone(),
            rules: opts.rules.compile(),
            fetch_cfg,
            toc_scope,
        }
    }

    /// The configured site base URL.
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// Resolve a possibly relative link against the site base.
    pub fn resolve(&self, link: &str) -> String {
        urls::resolve(&self.site_url, link)
    }

    /// Fetch a page with GET, degrading to `""` on any failure.
    pub async fn get_html(&self, url: &str) -> String {
        self.fetch_html(url, Method::GET, None).await
    }

    /// Fetch a page with POST and URL-encoded form data, degrading to `""`
    /// on any failure.
    pub async fn post_html(&self, url: &str, form: &[(String, String)]) -> String {
        self.fetch_html(url, Method::POST, Some(form)).await
    }

    async fn fetch_html(
        &self,
        url: &str,
        method: Method,
        form: Option<&[(String, String)]>,
    ) -> String {
        if url::Url::parse(url).is_err() {
            warn!(url, "not an absolute URL, skipping fetch");
            return String::new();
        }
        match fetch_text(&self.http, url, method, form, &self.fetch_cfg).await {
            Ok(text) => text,
            Err(err) => {
                warn!(url, error = %err, "fetch failed, returning empty page");
                String::new()
            }
        }
    }

    /// Search for books. `{{key}}` in the URL template is replaced with the
    /// key before fetching; the same call applied to a category-listing URL
    /// (no placeholder) extracts that listing.
    pub async fn search(&self, search_url: &str, key: &str) -> Vec<BookListing> {
        let Some(rule) = self.rules.search.as_ref() else {
            debug!("no ruleSearch group configured");
            return Vec::new();
        };
        let url = substitute_key(search_url, key);
        let html = self.get_html(&url).await;
        if html.is_empty() {
            return Vec::new();
        }
        let doc = Html::parse_document(&html);
        extract_search(&doc, rule, &self.site_url)
    }

    /// Extract the chapter list of a book.
    pub async fn toc(&self, toc_url: &str) -> Vec<ChapterRef> {
        let html = self.get_html(toc_url).await;
        if html.is_empty() {
            return Vec::new();
        }
        let doc = Html::parse_document(&html);
        extract_toc(&doc, &self.rules.toc, &self.toc_scope, &self.site_url)
    }

    /// Extract free-form book metadata. Skips the fetch entirely when no
    /// `ruleBookInfo` group is configured.
    pub async fn book_info(&self, info_url: &str) -> BookInfo {
        if self.rules.book_info.is_empty() {
            debug!("no ruleBookInfo group configured");
            return BookInfo::new();
        }
        let html = self.get_html(info_url).await;
        if html.is_empty() {
            return BookInfo::new();
        }
        let doc = Html::parse_document(&html);
        extract_book_info(&doc, &self.rules)
    }

    /// Extract category references from a discovery page.
    pub async fn find(&self, find_url: &str) -> Vec<CategoryRef> {
        let Some(rule) = self.rules.find.as_ref() else {
            debug!("no ruleFind group configured");
            return Vec::new();
        };
        let html = self.get_html(find_url).await;
        if html.is_empty() {
            return Vec::new();
        }
        let doc = Html::parse_document(&html);
        extract_find(&doc, rule, &self.site_url)
    }

    /// Assemble chapter content across paginated chapter pages.
    ///
    /// Follows `nextContentUrl` up to the page cap, appending each page's
    /// content fragment. The title comes from the first page that yields one.
    /// A failed fetch ends the loop and returns whatever accumulated. After
    /// the loop, `replaceRegex` matches are stripped globally and the content
    /// is trimmed.
    pub async fn content(&self, chapter_url: &str) -> ChapterContent {
        let Some(rule) = self.rules.content.as_ref() else {
            debug!("no ruleContent group configured");
            return ChapterContent::default();
        };

        let mut url = chapter_url.to_string();
        let mut content = String::new();
        let mut title = String::new();
        let mut pages = 0;

        while !url.is_empty() && pages < MAX_CONTENT_PAGES {
            let html = self.get_html(&url).await;
            if html.is_empty() {
                break;
            }
            // Scoped so the parsed document never lives across an await.
            let page = {
                let doc = Html::parse_document(&html);
                extract_content_page(&doc, rule)
            };
            content.push_str(&page.content);
            if title.is_empty() && !page.title.is_empty() {
                title = page.title;
            }
            url = self.resolve(&page.next_url);
            pages += 1;
        }

        if let Some(re) = rule.replace.as_ref() {
            content = re.replace_all(&content, "").into_owned();
        }
        ChapterContent {
            title,
            content: content.trim().to_string(),
        }
    }
}
