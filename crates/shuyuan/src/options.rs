// ABOUTME: Configuration options for the engine including TocSection and ClientBuilder.
// ABOUTME: ClientBuilder provides a fluent API for constructing Client instances with custom settings.

use std::collections::HashMap;
use std::time::Duration;

use crate::client::Client;
use crate::fetch::DEFAULT_USER_AGENT;
use crate::rules::{default_rules, RuleSet};

/// How the toc extractor locates the chapter container on a toc page.
///
/// The marked-section heuristic (container `ul.chapter`, marker `正文`) is
/// what the default site needs: its toc pages carry a teaser list before the
/// real one, distinguished by a short heading sibling. Sites whose
/// `chapterList` selector already lands on the right nodes should use
/// `RuleList`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TocSection {
    /// Use the rule's `chapterList` selector directly.
    RuleList,
    /// Pick the `container` match immediately preceded by a sibling element
    /// whose text equals `marker`, falling back to the first match.
    MarkedSection { container: String, marker: String },
}

impl Default for TocSection {
    fn default() -> Self {
        TocSection::MarkedSection {
            container: "ul.chapter".to_string(),
            marker: "正文".to_string(),
        }
    }
}

/// Configuration options for the engine client.
#[derive(Debug, Clone)]
pub struct Options {
    /// Site base URL: scheme + host, used for `Referer` headers and
    /// relative-URL resolution.
    pub site_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Courtesy-delay range applied once per fetch.
    pub request_delay: (Duration, Duration),
    /// Extra headers layered on top of the spoofed browser set.
    pub headers: HashMap<String, String>,
    pub http_client: Option<reqwest::Client>,
    pub rules: RuleSet,
    pub toc_section: TocSection,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            site_url: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            request_delay: (Duration::from_millis(500), Duration::from_millis(1500)),
            headers: HashMap::new(),
            http_client: None,
            rules: default_rules(),
            toc_section: TocSection::default(),
        }
    }
}

/// Builder for constructing Client instances with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    opts: Options,
}

impl ClientBuilder {
    /// Create a new ClientBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the site base URL (scheme + host).
    pub fn site_url(mut self, site_url: impl Into<String>) -> Self {
        self.opts.site_url = site_url.into();
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Set the total per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the connect timeout (shorter than the total timeout).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.opts.connect_timeout = timeout;
        self
    }

    /// Set the courtesy-delay range. `(ZERO, ZERO)` disables the delay.
    pub fn request_delay(mut self, min: Duration, max: Duration) -> Self {
        self.opts.request_delay = (min, max);
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Use a custom HTTP client instead of building one from the options.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Set the book-source rule set.
    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.opts.rules = rules;
        self
    }

    /// Set the toc container strategy.
    pub fn toc_section(mut self, toc_section: TocSection) -> Self {
        self.opts.toc_section = toc_section;
        self
    }

    /// Build the Client with the configured options.
    pub fn build(self) -> Client {
        Client::new(self.opts)
    }
}
