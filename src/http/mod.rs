//! Request and response model seen by the proxy
//!
//! A deliberately small slice of the fetch model: enough to classify
//! a request, key it in a bucket, and snapshot a response.

mod request;
mod response;
mod url;

pub use request::{CacheKey, Destination, Method, Request, RequestMode};
pub use response::{Response, ResponseKind};
pub use url::Url;
