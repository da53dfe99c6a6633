//! Cross-origin resource sharing.
//!
//! | Request | What happens |
//! |---|---|
//! | no `Origin` header | passed through, only `Vary: Origin` is added |
//! | `OPTIONS` + `Origin` + `Access-Control-Request-Method` | preflight, answered here with `204`; never reaches a handler |
//! | anything else with `Origin` | routed normally, allow headers added if origin and method pass |
//!
//! A preflight that fails the policy still gets `204`, just without any
//! `Access-Control-Allow-*` headers. The browser does the refusing.

use http::HeaderMap;
use http::header::{
    ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN,
};

use crate::method::Method;
use crate::response::Response;
use crate::status::Status;

#[derive(Clone, Debug)]
enum Origins {
    Any,
    List(Vec<String>),
}

/// A CORS policy.
///
/// Starts out allowing nothing; open it up with the builder methods:
///
/// ```rust
/// use articles::{Method, middleware::Cors};
///
/// let cors = Cors::new()
///     .allow_any_origin()
///     .allow_methods([Method::Get, Method::Post])
///     .allow_headers(["content-type"])
///     .allow_credentials(true);
/// ```
#[derive(Clone, Debug)]
pub struct Cors {
    origins: Origins,
    methods: Vec<Method>,
    headers: Vec<String>,
    credentials: bool,
}

impl Cors {
    pub fn new() -> Self {
        Self {
            origins: Origins::List(Vec::new()),
            methods: Vec::new(),
            headers: Vec::new(),
            credentials: false,
        }
    }

    pub fn allow_any_origin(mut self) -> Self {
        self.origins = Origins::Any;
        self
    }

    /// Allows exactly these origins (compared byte-for-byte, e.g. `https://example.com`).
    pub fn allow_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.origins = Origins::List(origins.into_iter().map(Into::into).collect());
        self
    }

    pub fn allow_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    /// Header names are matched case-insensitively.
    pub fn allow_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.headers = headers.into_iter().map(|h| h.as_ref().to_ascii_lowercase()).collect();
        self
    }

    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.credentials = allow;
        self
    }

    pub(crate) fn is_preflight(method: &http::Method, headers: &HeaderMap) -> bool {
        *method == http::Method::OPTIONS
            && headers.contains_key(ORIGIN)
            && headers.contains_key(ACCESS_CONTROL_REQUEST_METHOD)
    }

    /// Builds the complete response to a preflight request.
    pub(crate) fn preflight(&self, headers: &HeaderMap) -> Response {
        let mut res = Response::status(Status::NoContent);
        res.push_header("vary", "Origin");
        res.push_header("vary", "Access-Control-Request-Method");
        res.push_header("vary", "Access-Control-Request-Headers");

        let Some(origin) = header_str(headers, ORIGIN) else { return res };
        if !self.origin_allowed(origin) {
            return res;
        }

        let Some(requested) = header_str(headers, ACCESS_CONTROL_REQUEST_METHOD) else {
            return res;
        };
        let Ok(requested) = requested.to_ascii_uppercase().parse::<Method>() else {
            return res;
        };
        if !self.method_allowed(requested) {
            return res;
        }

        let requested_headers: Vec<String> = header_str(headers, ACCESS_CONTROL_REQUEST_HEADERS)
            .map(|list| {
                list.split(',')
                    .map(|h| h.trim().to_ascii_lowercase())
                    .filter(|h| !h.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        if !requested_headers.iter().all(|h| self.header_allowed(h)) {
            return res;
        }

        res.push_header("access-control-allow-origin", self.allow_origin_value(origin));
        res.push_header("access-control-allow-methods", requested.as_str());
        if !requested_headers.is_empty() {
            res.push_header("access-control-allow-headers", requested_headers.join(", "));
        }
        if self.credentials {
            res.push_header("access-control-allow-credentials", "true");
        }
        res
    }

    /// Adds the allow headers to the response of an actual (non-preflight) request.
    pub(crate) fn decorate(&self, method: &http::Method, headers: &HeaderMap, res: &mut Response) {
        res.push_header("vary", "Origin");

        let Some(origin) = header_str(headers, ORIGIN) else { return };
        if !self.origin_allowed(origin) {
            return;
        }
        match Method::try_from(method) {
            Ok(m) if self.method_allowed(m) => {}
            _ => return,
        }

        res.push_header("access-control-allow-origin", self.allow_origin_value(origin));
        if self.credentials {
            res.push_header("access-control-allow-credentials", "true");
        }
    }

    fn origin_allowed(&self, origin: &str) -> bool {
        match &self.origins {
            Origins::Any => true,
            Origins::List(list) => list.iter().any(|o| o == origin),
        }
    }

    // OPTIONS is implicitly allowed; preflights use it.
    fn method_allowed(&self, method: Method) -> bool {
        method == Method::Options || self.methods.contains(&method)
    }

    // `Origin` is always implicitly allowed as a request header.
    fn header_allowed(&self, name: &str) -> bool {
        name == "origin" || self.headers.iter().any(|h| h == name)
    }

    // Browsers reject `*` on credentialed requests, so echo the origin then.
    fn allow_origin_value(&self, origin: &str) -> String {
        match self.origins {
            Origins::Any if !self.credentials => "*".to_owned(),
            _ => origin.to_owned(),
        }
    }
}

impl Default for Cors {
    fn default() -> Self { Self::new() }
}

fn header_str(headers: &HeaderMap, name: http::header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.append(*k, v.parse().unwrap());
        }
        map
    }

    fn header<'a>(res: &'a Response, name: &str) -> Option<&'a str> {
        res.headers.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    fn policy() -> Cors {
        Cors::new()
            .allow_any_origin()
            .allow_methods([Method::Get, Method::Post])
            .allow_headers(["Content-Type"])
    }

    #[test]
    fn preflight_detection_needs_origin_and_request_method() {
        let full = headers(&[("origin", "http://a"), ("access-control-request-method", "GET")]);
        let no_method = headers(&[("origin", "http://a")]);

        assert!(Cors::is_preflight(&http::Method::OPTIONS, &full));
        assert!(!Cors::is_preflight(&http::Method::OPTIONS, &no_method));
        assert!(!Cors::is_preflight(&http::Method::GET, &full));
    }

    #[test]
    fn preflight_allows_configured_method_and_headers() {
        let req = headers(&[
            ("origin", "http://a"),
            ("access-control-request-method", "post"),
            ("access-control-request-headers", "Content-Type"),
        ]);
        let res = policy().preflight(&req);

        assert_eq!(res.status, Status::NoContent);
        assert_eq!(header(&res, "access-control-allow-origin"), Some("*"));
        assert_eq!(header(&res, "access-control-allow-methods"), Some("POST"));
        assert_eq!(header(&res, "access-control-allow-headers"), Some("content-type"));
        assert_eq!(header(&res, "access-control-allow-credentials"), None);
    }

    #[test]
    fn preflight_refuses_unlisted_method_or_header() {
        let bad_method = headers(&[("origin", "http://a"), ("access-control-request-method", "DELETE")]);
        let bad_header = headers(&[
            ("origin", "http://a"),
            ("access-control-request-method", "GET"),
            ("access-control-request-headers", "x-secret"),
        ]);

        for req in [bad_method, bad_header] {
            let res = policy().preflight(&req);
            assert_eq!(res.status, Status::NoContent);
            assert_eq!(header(&res, "access-control-allow-origin"), None);
            assert_eq!(header(&res, "vary"), Some("Origin"));
        }
    }

    #[test]
    fn credentials_echo_the_origin() {
        let cors = policy().allow_credentials(true);
        let mut res = Response::text("ok");
        cors.decorate(&http::Method::GET, &headers(&[("origin", "http://a")]), &mut res);

        assert_eq!(header(&res, "access-control-allow-origin"), Some("http://a"));
        assert_eq!(header(&res, "access-control-allow-credentials"), Some("true"));
    }

    #[test]
    fn listed_origins_only() {
        let cors = policy().allow_origins(["http://ok"]);

        let mut allowed = Response::text("ok");
        cors.decorate(&http::Method::GET, &headers(&[("origin", "http://ok")]), &mut allowed);
        assert_eq!(header(&allowed, "access-control-allow-origin"), Some("http://ok"));

        let mut denied = Response::text("ok");
        cors.decorate(&http::Method::GET, &headers(&[("origin", "http://evil")]), &mut denied);
        assert_eq!(header(&denied, "access-control-allow-origin"), None);
    }

    #[test]
    fn requests_without_origin_only_vary() {
        let mut res = Response::text("ok");
        policy().decorate(&http::Method::GET, &HeaderMap::new(), &mut res);

        assert_eq!(res.headers.len(), 2);
        assert_eq!(header(&res, "vary"), Some("Origin"));
    }
}
