use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, LOCATION, SET_COOKIE};
use axum::http::StatusCode;
use axum::response::Response;
use chrono::Utc;
use serde::Serialize;

use crate::config::Config;
use crate::request::RequestInfo;
use crate::view::{ViewCookie, ViewKind};

/// Where the current view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    SwitchParam,
    Cookie,
    Detection,
    /// No request context.
    Detached,
}

/// What view a single request is in, plus cookie and redirect factories.
///
/// Constructed once per request; the `set_*` methods are the only mutators.
#[derive(Debug, Clone)]
pub struct ViewState {
    config: Arc<Config>,
    current: Option<ViewKind>,
    requested: Option<ViewKind>,
    source: Option<ResolutionSource>,
    has_request: bool,
    switch_param: Option<String>,
}

impl ViewState {
    /// Resolve what the client asked for.
    ///
    /// Precedence: switch parameter, then cookie. Without either, the view
    /// stays unresolved until live detection runs. Without a request the
    /// state is pinned to [`ViewKind::NotMobile`].
    ///
    /// An unrecognized switch parameter value means `full`; an unrecognized
    /// cookie value is ignored so detection can replace it.
    pub fn new(config: Arc<Config>, request: Option<&RequestInfo>) -> Self {
        let Some(request) = request else {
            return Self::detached(config);
        };

        let switch_param = request.query_param(&config.switch_param).map(str::to_owned);
        let mut state = Self {
            config,
            current: None,
            requested: None,
            source: None,
            has_request: true,
            switch_param,
        };

        if let Some(raw) = state.switch_param.as_deref() {
            let kind = ViewKind::from_client_token(raw).unwrap_or(ViewKind::Full);
            state.requested = Some(kind);
            state.current = Some(kind);
            state.source = Some(ResolutionSource::SwitchParam);
        } else if let Some(raw) = request.cookie(&state.config.cookie.key) {
            match ViewKind::from_client_token(raw) {
                Some(kind) => {
                    state.requested = Some(kind);
                    state.current = Some(kind);
                    state.source = Some(ResolutionSource::Cookie);
                }
                None => tracing::debug!(value = raw, "Ignoring unrecognized device view cookie"),
            }
        }

        state
    }

    /// State for code running outside any request.
    pub fn detached(config: Arc<Config>) -> Self {
        Self {
            config,
            current: Some(ViewKind::NotMobile),
            requested: None,
            source: Some(ResolutionSource::Detached),
            has_request: false,
            switch_param: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn current(&self) -> Option<ViewKind> {
        self.current
    }

    /// The kind explicitly supplied by the client, if any.
    pub fn requested(&self) -> Option<ViewKind> {
        self.requested
    }

    pub fn source(&self) -> Option<ResolutionSource> {
        self.source
    }

    pub fn switch_param_name(&self) -> &str {
        &self.config.switch_param
    }

    pub fn cookie_key(&self) -> &str {
        &self.config.cookie.key
    }

    pub fn is_full_view(&self) -> bool {
        self.current == Some(ViewKind::Full)
    }

    pub fn is_tablet_view(&self) -> bool {
        self.current == Some(ViewKind::Tablet)
    }

    pub fn is_mobile_view(&self) -> bool {
        self.current == Some(ViewKind::Mobile)
    }

    pub fn is_not_mobile_view(&self) -> bool {
        self.current == Some(ViewKind::NotMobile)
    }

    pub fn has_switch_param(&self) -> bool {
        self.has_request && self.switch_param.is_some()
    }

    /// Switch parameter value; `full` when a request exists without one.
    pub fn switch_param_value(&self) -> Option<ViewKind> {
        if !self.has_request {
            return None;
        }
        Some(
            self.switch_param
                .as_deref()
                .and_then(ViewKind::from_client_token)
                .unwrap_or(ViewKind::Full),
        )
    }

    /// The view a switch-parameter redirect lands on, after the tablet fold.
    pub fn switch_target(&self) -> Option<ViewKind> {
        self.switch_param_value()
            .map(|kind| kind.fold_tablet(self.config.redirect.detect_tablet_as_mobile))
    }

    pub fn set_view(&mut self, kind: ViewKind) {
        if self.is_not_mobile_view() {
            return;
        }
        self.current = Some(kind);
        self.source = Some(ResolutionSource::Detection);
    }

    pub fn set_mobile_view(&mut self) {
        self.set_view(ViewKind::Mobile);
    }

    pub fn set_tablet_view(&mut self) {
        self.set_view(ViewKind::Tablet);
    }

    pub fn set_full_view(&mut self) {
        self.set_view(ViewKind::Full);
    }

    pub fn set_not_mobile_view(&mut self) {
        self.set_view(ViewKind::NotMobile);
    }

    /// The view cookie for `kind`, expiring per the configured modifier.
    pub fn create_cookie(&self, kind: ViewKind) -> ViewCookie {
        ViewCookie::new(&self.config.cookie, kind, Utc::now())
    }

    /// Redirect to `redirect_url` after a switch, carrying the cookie for the
    /// requested view (unknown or absent values mean `full`).
    pub fn redirect_response_by_switch_param(&self, redirect_url: &str) -> Option<Response> {
        let kind = self.switch_target().unwrap_or(ViewKind::Full);
        let status = self.config.redirect.status_code(kind);
        self.redirect_response(kind, redirect_url, status)
    }

    /// Redirect to `location` with `status`, carrying the cookie for `kind`.
    ///
    /// `None` when `location` cannot be sent as a header value.
    pub fn redirect_response(
        &self,
        kind: ViewKind,
        location: &str,
        status: StatusCode,
    ) -> Option<Response> {
        let cookie = self.create_cookie(kind);
        let body = format!(
            "<!DOCTYPE html><html><head><meta charset=\"UTF-8\" />\
             <meta http-equiv=\"refresh\" content=\"0;url='{0}'\" />\
             <title>Redirecting to {0}</title></head>\
             <body>Redirecting to <a href=\"{0}\">{0}</a>.</body></html>",
            html_escape(location)
        );

        match Response::builder()
            .status(status)
            .header(LOCATION, location)
            .header(SET_COOKIE, cookie.to_string())
            .header(CONTENT_TYPE, "text/html; charset=UTF-8")
            .body(Body::from(body))
        {
            Ok(response) => Some(response),
            Err(e) => {
                tracing::warn!(location, "Cannot build device view redirect: {e}");
                None
            }
        }
    }

    /// Attach the cookie for `kind` to `response`.
    ///
    /// No-op without a request context or for [`ViewKind::NotMobile`].
    pub fn modify_response(&self, kind: ViewKind, mut response: Response) -> Response {
        if self.is_not_mobile_view() || kind == ViewKind::NotMobile {
            return response;
        }
        if let Err(e) = self.create_cookie(kind).apply_to(response.headers_mut()) {
            tracing::warn!("Cannot attach device view cookie: {e}");
        }
        response
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn request(uri: &str, cookie: Option<&str>) -> RequestInfo {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        RequestInfo::from_request(&builder.body(Body::empty()).unwrap())
    }

    fn state(uri: &str, cookie: Option<&str>) -> ViewState {
        ViewState::new(Arc::new(Config::default()), Some(&request(uri, cookie)))
    }

    #[test]
    fn test_switch_param_beats_cookie() {
        let state = state("http://example.com/?device_view=tablet", Some("device_view=full"));
        assert_eq!(state.requested(), Some(ViewKind::Tablet));
        assert!(state.is_tablet_view());
        assert_eq!(state.source(), Some(ResolutionSource::SwitchParam));
    }

    #[test]
    fn test_cookie_used_without_switch_param() {
        let state = state("http://example.com/", Some("device_view=full"));
        assert!(state.is_full_view());
        assert_eq!(state.requested(), Some(ViewKind::Full));
        assert!(!state.has_switch_param());
    }

    #[test]
    fn test_unknown_switch_value_means_full() {
        let state = state("http://example.com/?device_view=watch", None);
        assert!(state.has_switch_param());
        assert_eq!(state.switch_param_value(), Some(ViewKind::Full));
        assert!(state.is_full_view());
    }

    #[test]
    fn test_unknown_cookie_value_is_no_signal() {
        let state = state("http://example.com/", Some("device_view=watch"));
        assert_eq!(state.requested(), None);
        assert_eq!(state.current(), None);
    }

    #[test]
    fn test_switch_param_value_defaults_to_full_with_request() {
        let state = state("http://example.com/", None);
        assert_eq!(state.switch_param_value(), Some(ViewKind::Full));
    }

    #[test]
    fn test_detached_state() {
        let mut state = ViewState::detached(Arc::new(Config::default()));
        assert!(state.is_not_mobile_view());
        assert!(!state.has_switch_param());
        assert_eq!(state.switch_param_value(), None);

        state.set_mobile_view();
        assert!(state.is_not_mobile_view());

        let response = state.modify_response(ViewKind::Mobile, Response::new(Body::empty()));
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[test]
    fn test_redirect_by_switch_param_uses_configured_status() {
        let mut config = Config::default();
        config.redirect.tablet.status_code = 301;
        let state = ViewState::new(
            Arc::new(config),
            Some(&request("http://example.com/?device_view=tablet", None)),
        );

        let response = state
            .redirect_response_by_switch_param("http://example.com/")
            .unwrap();
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[LOCATION], "http://example.com/");
        assert!(response.headers()[SET_COOKIE]
            .to_str()
            .unwrap()
            .starts_with("device_view=tablet;"));
    }

    #[test]
    fn test_redirect_by_switch_param_folds_tablet() {
        let mut config = Config::default();
        config.redirect.detect_tablet_as_mobile = true;
        let state = ViewState::new(
            Arc::new(config),
            Some(&request("http://example.com/?device_view=tablet", None)),
        );

        let response = state
            .redirect_response_by_switch_param("http://example.com/")
            .unwrap();
        assert!(response.headers()[SET_COOKIE]
            .to_str()
            .unwrap()
            .starts_with("device_view=mobile;"));
    }

    #[test]
    fn test_modify_response_adds_cookie() {
        let state = state("http://example.com/", None);
        let response = state.modify_response(ViewKind::Tablet, Response::new(Body::empty()));
        assert!(response.headers()[SET_COOKIE]
            .to_str()
            .unwrap()
            .starts_with("device_view=tablet;"));
    }
}
