//! Install-time asset list

use crate::error::{ProxyError, ProxyResult};
use crate::http::{Request, Url};
use std::collections::HashSet;

/// Ordered list of absolute URLs pre-populated into the bucket at install
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    urls: Vec<Url>,
}

impl Manifest {
    /// Resolve `entries` against `origin`.
    ///
    /// Duplicates (after resolution) are rejected: the bulk store would
    /// otherwise commit the same key twice in one batch.
    pub fn resolve<S: AsRef<str>>(origin: &Url, entries: &[S]) -> ProxyResult<Self> {
        let mut seen = HashSet::new();
        let mut urls = Vec::with_capacity(entries.len());

        for entry in entries {
            let url = origin.join(entry.as_ref())?;
            if !seen.insert(url.clone()) {
                return Err(ProxyError::ManifestInvalid(format!(
                    "duplicate entry {}",
                    url
                )));
            }
            urls.push(url);
        }

        Ok(Self { urls })
    }

    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// The GET requests install issues, in manifest order
    pub fn requests(&self) -> impl Iterator<Item = Request> + '_ {
        self.urls.iter().cloned().map(Request::get)
    }
}
