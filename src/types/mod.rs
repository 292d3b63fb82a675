pub mod json_path;
pub mod primitive;
pub mod version;

use http::{HeaderMap, Method};

/// Read access to the parts of an inbound request that route validation needs.
pub trait HttpLike {
    fn method_ref(&self) -> &Method;
    fn path_ref(&self) -> &str;
    fn headers_ref(&self) -> &HeaderMap;
    fn query_ref(&self) -> Option<&str>;
}

impl<T> HttpLike for http::Request<T> {
    fn method_ref(&self) -> &Method {
        self.method()
    }

    fn path_ref(&self) -> &str {
        self.uri().path()
    }

    fn headers_ref(&self) -> &HeaderMap {
        self.headers()
    }

    fn query_ref(&self) -> Option<&str> {
        self.uri().query()
    }
}

/// The request-side input handed to each [`crate::validator::RequestCheck`].
///
/// `headers` is `None` when the caller only supplied a method and a path.
#[derive(Debug, Clone, Copy)]
pub struct RequestParts<'r> {
    pub method: &'r str,
    pub path: &'r str,
    pub query: Option<&'r str>,
    pub headers: Option<&'r HeaderMap>,
}

impl<'r> RequestParts<'r> {
    /// Splits a raw request target such as `/pets?limit=10` into path and query.
    pub fn from_target(method: &'r str, target: &'r str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };
        Self {
            method,
            path,
            query,
            headers: None,
        }
    }

    pub fn from_request(request: &'r impl HttpLike) -> Self {
        Self {
            method: request.method_ref().as_str(),
            path: request.path_ref(),
            query: request.query_ref(),
            headers: Some(request.headers_ref()),
        }
    }
}
