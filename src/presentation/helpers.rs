use crate::detect::{DeviceClassifier, DeviceDetector};
use crate::request::RequestInfo;
use crate::view::ViewState;

/// Read-only view/device queries for templates.
pub struct ViewHelpers<'a> {
    state: &'a ViewState,
    request: Option<&'a RequestInfo>,
    detector: DeviceDetector<'a>,
}

impl<'a> ViewHelpers<'a> {
    pub fn new(
        state: &'a ViewState,
        request: Option<&'a RequestInfo>,
        classifier: &'a dyn DeviceClassifier,
    ) -> Self {
        let mut detector = DeviceDetector::new(classifier);
        detector.set_user_agent(request.and_then(RequestInfo::user_agent));
        Self {
            state,
            request,
            detector,
        }
    }

    pub fn is_mobile(&self) -> bool {
        self.detector.is_mobile()
    }

    pub fn is_tablet(&self) -> bool {
        self.detector.is_tablet()
    }

    /// Any capability the classifier declares; unknown names are `false`.
    pub fn is_device(&self, name: &str) -> bool {
        self.detector.is(name)
    }

    pub fn is_ios(&self) -> bool {
        self.detector.is("iOS")
    }

    pub fn is_android_os(&self) -> bool {
        self.detector.is("AndroidOS")
    }

    pub fn device_version(&self, name: &str) -> Option<String> {
        self.detector.version(name)
    }

    pub fn is_full_view(&self) -> bool {
        self.state.is_full_view()
    }

    pub fn is_mobile_view(&self) -> bool {
        self.state.is_mobile_view()
    }

    pub fn is_tablet_view(&self) -> bool {
        self.state.is_tablet_view()
    }

    pub fn is_not_mobile_view(&self) -> bool {
        self.state.is_not_mobile_view()
    }

    /// Names usable with [`is_device`](Self::is_device).
    pub fn rules_list(&self) -> Vec<&str> {
        self.detector.capability_names().collect()
    }

    /// Link to the full-view host.
    ///
    /// `None` without a configured host. The bare host without a request or
    /// when `add_path_and_query` is false.
    pub fn full_view_url(&self, add_path_and_query: bool) -> Option<String> {
        let host = self
            .state
            .config()
            .redirect
            .full
            .host
            .as_deref()
            .filter(|h| !h.is_empty())?;

        let request = match self.request {
            Some(request) if add_path_and_query => request,
            _ => return Some(host.to_owned()),
        };

        let mut url = format!("{}{}", host.trim_end_matches('/'), request.path());
        let query = request.normalized_query();
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::detect::KeywordClassifier;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;

    const IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1";

    fn request(uri: &str) -> RequestInfo {
        RequestInfo::from_request(
            &Request::builder()
                .uri(uri)
                .header("user-agent", IPAD)
                .body(Body::empty())
                .unwrap(),
        )
    }

    fn config_with_full_host(host: &str) -> Arc<Config> {
        let mut config = Config::default();
        config.redirect.full.host = Some(host.to_string());
        Arc::new(config)
    }

    #[test]
    fn test_full_view_url_keeps_path_and_query() {
        let config = config_with_full_host("http://www.example.com/");
        let req = request("http://t.example.com/some/parameters?z=1&a=2");
        let state = ViewState::new(config, Some(&req));
        let classifier = KeywordClassifier::new().unwrap();
        let helpers = ViewHelpers::new(&state, Some(&req), &classifier);

        assert_eq!(
            helpers.full_view_url(true).as_deref(),
            Some("http://www.example.com/some/parameters?a=2&z=1")
        );
        assert_eq!(
            helpers.full_view_url(false).as_deref(),
            Some("http://www.example.com/")
        );
    }

    #[test]
    fn test_full_view_url_without_host_or_request() {
        let classifier = KeywordClassifier::new().unwrap();

        let state = ViewState::detached(Arc::new(Config::default()));
        assert_eq!(ViewHelpers::new(&state, None, &classifier).full_view_url(true), None);

        let state = ViewState::detached(config_with_full_host("http://www.example.com"));
        assert_eq!(
            ViewHelpers::new(&state, None, &classifier).full_view_url(true).as_deref(),
            Some("http://www.example.com")
        );
    }

    #[test]
    fn test_device_queries_use_request_user_agent() {
        let req = request("http://example.com/");
        let state = ViewState::new(Arc::new(Config::default()), Some(&req));
        let classifier = KeywordClassifier::new().unwrap();
        let helpers = ViewHelpers::new(&state, Some(&req), &classifier);

        assert!(helpers.is_tablet());
        assert!(helpers.is_ios());
        assert!(!helpers.is_android_os());
        assert!(helpers.is_device("ipad"));
        assert_eq!(helpers.device_version("iOS").as_deref(), Some("16.6"));
        assert!(helpers.rules_list().contains(&"iPad"));
    }
}
