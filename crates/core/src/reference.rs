//! Locator parsing for hosted source files.
//!
//! A locator is `<blob-url> [<from>-<to>]`, for example
//! `https://github.com/rust-lang/rust/blob/master/README.md 10-20`.
//!
//! Parsing never fails. A locator whose URL does not have the
//! `<host>/<owner>/<repo>/blob/<revision>/<path>` shape yields a reference
//! with empty identifiers, and [`SourceReference::is_renderable`] reports
//! `false` for it. Non-numeric line bounds coerce to 0.

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Host that serves blob pages.
pub const DEFAULT_DISPLAY_HOST: &str = "github.com";

/// Host that serves raw file contents.
pub const DEFAULT_RAW_HOST: &str = "raw.githubusercontent.com";

/// Host names used to build display and raw-content URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hosts {
    pub display: String,
    pub raw: String,
}

impl Default for Hosts {
    fn default() -> Self {
        Self { display: DEFAULT_DISPLAY_HOST.into(), raw: DEFAULT_RAW_HOST.into() }
    }
}

/// Structured identification of a remote file plus an optional line window.
///
/// `line_from` and `line_to` both 0 means no window was requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SourceReference {
    pub owner: String,
    pub repository: String,
    pub revision: String,
    pub path: String,
    pub line_from: usize,
    pub line_to: usize,
}

impl SourceReference {
    /// Parse a locator against the default display host.
    pub fn parse(locator: &str) -> Self {
        Self::parse_with_host(locator, DEFAULT_DISPLAY_HOST)
    }

    /// Parse a locator, requiring blob URLs to live on `display_host`.
    pub fn parse_with_host(locator: &str, display_host: &str) -> Self {
        let locator = locator.trim();
        let (url, lines) = locator.split_once(' ').unwrap_or((locator, ""));
        // Everything after the url is the window; each bound keeps its leading digits.
        let (from, to) = lines.split_once('-').unwrap_or((lines, ""));

        let mut reference = Self { line_from: coerce_line(from), line_to: coerce_line(to), ..Default::default() };

        if let Some(captures) = blob_pattern(display_host).and_then(|re| re.captures(url)) {
            reference.owner = captures[1].to_string();
            reference.repository = captures[2].to_string();
            reference.revision = captures[3].to_string();
            reference.path = captures[4].to_string();
        } else {
            tracing::debug!(url, "locator is not a blob url");
        }

        reference
    }

    /// Whether every identifier needed to build a URL is present.
    pub fn is_renderable(&self) -> bool {
        !self.owner.is_empty() && !self.repository.is_empty() && !self.revision.is_empty() && !self.path.is_empty()
    }

    /// URL of the raw file contents; used as fetch target and cache key seed.
    pub fn raw_url(&self, hosts: &Hosts) -> String {
        format!("https://{}/{}/{}/{}/{}", hosts.raw, self.owner, self.repository, self.revision, self.path)
    }

    /// URL of the human-facing blob page.
    pub fn display_url(&self, hosts: &Hosts) -> String {
        format!("https://{}/{}/{}/blob/{}/{}", hosts.display, self.owner, self.repository, self.revision, self.path)
    }

    /// Last path segment.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Lowercased extension of the file name, empty when there is none.
    pub fn extension(&self) -> String {
        match self.file_name().rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => String::new(),
        }
    }
}

fn blob_pattern(display_host: &str) -> Option<Regex> {
    let pattern = format!(
        r"{}/([A-Za-z0-9_-]+)/([A-Za-z0-9_-]+)/blob/([A-Za-z0-9_-]+)/(.*)$",
        regex::escape(display_host)
    );
    Regex::new(&pattern).ok()
}

/// Leading decimal digits of `raw`, or 0.
fn coerce_line(raw: &str) -> usize {
    let raw = raw.trim_start();
    let end = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
    raw[..end].parse().unwrap_or(0)
}
