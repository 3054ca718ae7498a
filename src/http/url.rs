//! Absolute http(s) URLs
//!
//! Parsing, reference resolution and origin comparison follow the WHATWG
//! URL standard through the `url` crate. This wrapper only narrows it to
//! `http`/`https` and drops the fragment, which never reaches the network
//! and must not split one request into two cache keys.

use crate::error::{ProxyError, ProxyResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An absolute `http` or `https` URL with the fragment stripped
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Url(url::Url);

impl Url {
    /// Parse an absolute URL
    pub fn parse(input: &str) -> ProxyResult<Self> {
        let parsed = url::Url::parse(input.trim()).map_err(|e| invalid(input, e))?;
        Self::checked(input, parsed)
    }

    /// Resolve `reference` against this URL
    pub fn join(&self, reference: &str) -> ProxyResult<Self> {
        let joined = self.0.join(reference.trim()).map_err(|e| invalid(reference, e))?;
        Self::checked(reference, joined)
    }

    fn checked(input: &str, mut url: url::Url) -> ProxyResult<Self> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(input, "only http and https are supported"));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(invalid(input, "missing host"));
        }
        url.set_fragment(None);
        Ok(Self(url))
    }

    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// `[userinfo@]host[:port]`, with the scheme's default port omitted
    pub fn authority(&self) -> &str {
        self.0.authority()
    }

    /// Path component, always starting with `/`
    pub fn path(&self) -> &str {
        self.0.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.0.query()
    }

    /// `scheme://host[:port]`
    pub fn origin(&self) -> String {
        self.0.origin().ascii_serialization()
    }

    pub fn same_origin(&self, other: &Url) -> bool {
        self.0.origin() == other.0.origin()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

fn invalid(input: &str, reason: impl fmt::Display) -> ProxyError {
    ProxyError::InvalidUrl {
        url: input.to_string(),
        reason: reason.to_string(),
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl FromStr for Url {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Url {
    type Error = ProxyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Url> for String {
    fn from(url: Url) -> Self {
        url.0.into()
    }
}
