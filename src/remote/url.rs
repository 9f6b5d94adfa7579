//! URL capability

use crate::annex::Annex;
use crate::error::RemoteResult;

/// Result of checking whether a URL can be downloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlCheck {
    /// Downloadable, nothing more is known
    Available,

    /// Not downloadable right now
    Unavailable,

    /// Downloadable as these items
    Items(Vec<UrlItem>),
}

/// One downloadable item behind a checked URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlItem {
    /// Set when the item lives at its own URL. Must not contain spaces.
    pub url: Option<String>,
    pub size: Option<u64>,
    /// Suggested filename
    pub filename: Option<String>,
}

impl UrlItem {
    /// An item with neither URL, size nor filename
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Backends that can download content from URLs
pub trait UrlRemote {
    /// Whether the remote wants to handle downloads from `url`
    fn claim_url(&mut self, annex: &mut Annex<'_>, url: &str) -> RemoteResult<bool>;

    /// Check, without downloading, whether `url` can be downloaded
    fn check_url(&mut self, annex: &mut Annex<'_>, url: &str) -> RemoteResult<UrlCheck>;
}
