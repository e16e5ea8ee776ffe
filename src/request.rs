//! Framework-neutral snapshot of the parts of an HTTP request the device
//! view logic reads.

use std::collections::BTreeMap;

use axum::extract::MatchedPath;
use axum::http::{HeaderMap, Request};
use axum_extra::headers::{Cookie, HeaderMapExt, Host, UserAgent};
use url::form_urlencoded;

/// Marks a request as a sub-request (e.g. an internal include).
/// Sub-requests are never resolved or redirected.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    scheme: String,
    host: String,
    port: Option<u16>,
    path: String,
    query: Vec<(String, String)>,
    user_agent: Option<String>,
    cookies: Vec<(String, String)>,
    route: Option<String>,
    main_request: bool,
}

impl RequestInfo {
    /// Capture a request.
    ///
    /// Scheme comes from the URI, else `http`; `X-Forwarded-Proto` is
    /// ignored. Host comes from the `Host` header, then the URI authority.
    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self::capture(req, false)
    }

    /// Like [`from_request`](Self::from_request), but a URI without a scheme
    /// takes it from `X-Forwarded-Proto`.
    ///
    /// Only for services behind a proxy that overwrites that header; any
    /// client can send it.
    pub fn from_proxied_request<B>(req: &Request<B>) -> Self {
        Self::capture(req, true)
    }

    fn capture<B>(req: &Request<B>, trust_forwarded_proto: bool) -> Self {
        let headers = req.headers();
        let uri = req.uri();

        let scheme = uri
            .scheme_str()
            .map(str::to_ascii_lowercase)
            .or_else(|| {
                trust_forwarded_proto
                    .then(|| forwarded_proto(headers))
                    .flatten()
            })
            .unwrap_or_else(|| "http".to_string());

        let (host, port) = match headers.typed_get::<Host>() {
            Some(host) => (host.hostname().to_owned(), host.port()),
            None => (
                uri.host().unwrap_or_default().to_owned(),
                uri.port_u16(),
            ),
        };

        let query = uri
            .query()
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        let cookies = headers
            .typed_get::<Cookie>()
            .map(|c| {
                c.iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            scheme,
            host: host.to_ascii_lowercase(),
            port,
            path: uri.path().to_owned(),
            query,
            user_agent: headers.typed_get::<UserAgent>().map(|ua| ua.as_str().to_owned()),
            cookies,
            route: req
                .extensions()
                .get::<MatchedPath>()
                .map(|p| p.as_str().to_owned()),
            main_request: req.extensions().get::<SubRequest>().is_none(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Host without port.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Matched route path, when the request went through a router.
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    pub fn is_main_request(&self) -> bool {
        self.main_request
    }

    /// `scheme://host`, the form configured redirect hosts are compared against.
    pub fn scheme_and_host(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// `scheme://host[:port]`, port only when it is not the scheme default.
    pub fn scheme_and_http_host(&self) -> String {
        match self.port {
            Some(port) if !is_default_port(&self.scheme, port) => {
                format!("{}://{}:{}", self.scheme, self.host, port)
            }
            _ => self.scheme_and_host(),
        }
    }

    /// `scheme://host[:port]`, or `None` when the request named no host
    /// (origin-form URI without a `Host` header).
    pub fn origin(&self) -> Option<String> {
        (!self.host.is_empty()).then(|| self.scheme_and_http_host())
    }

    /// The site root: [`origin`](Self::origin), or `/` without a host.
    pub fn root_url(&self) -> String {
        self.origin().unwrap_or_else(|| "/".to_string())
    }

    pub fn has_query_param(&self, name: &str) -> bool {
        self.query.iter().any(|(k, _)| k == name)
    }

    /// Last value of `name` in the query string.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The query string in normalized form (keys sorted, last value wins).
    pub fn normalized_query(&self) -> String {
        encode_query(self.query_map())
    }

    /// Normalized query with `name` forced to `value`.
    pub fn query_with(&self, name: &str, value: &str) -> String {
        let mut params = self.query_map();
        params.insert(name, value);
        encode_query(params)
    }

    /// Normalized query with `name` removed.
    pub fn query_without(&self, name: &str) -> String {
        let mut params = self.query_map();
        params.remove(name);
        encode_query(params)
    }

    /// URL of the request with `query` in place of its own.
    ///
    /// Relative (path and query only) when the request named no host.
    pub fn url_with_query(&self, query: &str) -> String {
        let mut url = self.origin().unwrap_or_default();
        url.push_str(&self.path);
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    fn query_map(&self) -> BTreeMap<&str, &str> {
        self.query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

fn encode_query(params: BTreeMap<&str, &str>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

fn forwarded_proto(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
}

fn is_default_port(scheme: &str, port: u16) -> bool {
    matches!((scheme, port), ("http", 80) | ("https", 443))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn info(uri: &str) -> RequestInfo {
        RequestInfo::from_request(&Request::builder().uri(uri).body(Body::empty()).unwrap())
    }

    #[test]
    fn test_absolute_uri_supplies_scheme_and_host() {
        let req = info("https://T.Example.com:8443/some/parameters?some=param");
        assert_eq!(req.scheme(), "https");
        assert_eq!(req.host(), "t.example.com");
        assert_eq!(req.scheme_and_http_host(), "https://t.example.com:8443");
        assert_eq!(req.path(), "/some/parameters");
    }

    #[test]
    fn test_host_header_and_forwarded_proto() {
        let req = Request::builder()
            .uri("/")
            .header("host", "m.example.com:80")
            .header("x-forwarded-proto", "HTTPS, http")
            .body(Body::empty())
            .unwrap();

        let info = RequestInfo::from_proxied_request(&req);
        assert_eq!(info.scheme_and_host(), "https://m.example.com");
        assert_eq!(info.port(), Some(80));

        // Not trusted unless asked for.
        let info = RequestInfo::from_request(&req);
        assert_eq!(info.scheme_and_host(), "http://m.example.com");
        assert_eq!(info.scheme_and_http_host(), "http://m.example.com");
    }

    #[test]
    fn test_forwarded_proto_never_overrides_uri_scheme() {
        let req = Request::builder()
            .uri("http://example.com/")
            .header("x-forwarded-proto", "https")
            .body(Body::empty())
            .unwrap();
        assert_eq!(RequestInfo::from_proxied_request(&req).scheme(), "http");
    }

    #[test]
    fn test_missing_host_gives_relative_urls() {
        let req = info("/page?device_view=mobile&a=1");
        assert_eq!(req.host(), "");
        assert_eq!(req.origin(), None);
        assert_eq!(req.root_url(), "/");
        assert_eq!(req.url_with_query(&req.query_without("device_view")), "/page?a=1");

        let req = info("http://example.com:8080/page");
        assert_eq!(req.origin().as_deref(), Some("http://example.com:8080"));
        assert_eq!(req.root_url(), "http://example.com:8080");
    }

    #[test]
    fn test_query_normalization_sorts_and_overrides() {
        let req = info("http://example.com/?z=1&device_view=full&a=b%20c");
        assert_eq!(req.query_param("device_view"), Some("full"));
        assert_eq!(req.normalized_query(), "a=b+c&device_view=full&z=1");
        assert_eq!(req.query_with("device_view", "tablet"), "a=b+c&device_view=tablet&z=1");
        assert_eq!(req.query_without("device_view"), "a=b+c&z=1");
    }

    #[test]
    fn test_cookie_lookup() {
        let req = Request::builder()
            .uri("/")
            .header("cookie", "session=abc; device_view=mobile")
            .body(Body::empty())
            .unwrap();
        let info = RequestInfo::from_request(&req);
        assert_eq!(info.cookie("device_view"), Some("mobile"));
        assert_eq!(info.cookie("missing"), None);
    }

    #[test]
    fn test_sub_request_marker() {
        let mut req = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert!(RequestInfo::from_request(&req).is_main_request());
        req.extensions_mut().insert(SubRequest);
        assert!(!RequestInfo::from_request(&req).is_main_request());
    }
}
