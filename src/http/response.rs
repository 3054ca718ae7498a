//! Response snapshots

use serde::{Deserialize, Serialize};

/// How the response relates to the requesting origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Same-origin
    #[default]
    Basic,
    /// Cross-origin, CORS-approved
    Cors,
    /// Cross-origin without CORS; contents must not be trusted
    Opaque,
}

/// A response as returned to the page or stored in a bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(with = "body_hex", default)]
    pub body: Vec<u8>,
    #[serde(default)]
    pub kind: ResponseKind,
    /// Final URL the response came from
    #[serde(default)]
    pub url: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: vec![],
            body: body.into(),
            kind: ResponseKind::Basic,
            url: String::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_kind(mut self, kind: ResponseKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Status in the 200-299 range
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether a cache-first miss may store this response
    pub fn is_cacheable_static(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }

    /// Body decoded as UTF-8, lossily
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Bodies are stored hex-encoded so entries stay valid JSON
mod body_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cacheable_static_requires_basic_200() {
        assert!(Response::new(200, "ok").is_cacheable_static());
        assert!(!Response::new(201, "").is_cacheable_static());
        assert!(!Response::new(404, "").is_cacheable_static());
        assert!(!Response::new(200, "")
            .with_kind(ResponseKind::Opaque)
            .is_cacheable_static());
        assert!(!Response::new(200, "")
            .with_kind(ResponseKind::Cors)
            .is_cacheable_static());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let resp = Response::new(200, "").with_header("Content-Type", "text/html");
        assert_eq!(resp.header("content-type"), Some("text/html"));
        assert_eq!(resp.header("etag"), None);
    }

    #[test]
    fn body_serializes_as_hex() {
        let resp = Response::new(200, vec![0x00, 0xff, b'a']);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["body"], "00ff61");

        let parsed: Response = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.body, vec![0x00, 0xff, b'a']);
    }
}
