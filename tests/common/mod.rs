//! Shared test utilities.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use device_view::config::Config;
use device_view::detect::{CapabilityRegistry, DeviceClassifier};
use device_view::listener::DeviceViewListener;
use device_view::server::router::build_router;
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Classifier with canned answers, whatever the user agent.
pub struct FixedClassifier {
    pub mobile: bool,
    pub tablet: bool,
    registry: CapabilityRegistry,
}

impl FixedClassifier {
    pub fn new(mobile: bool, tablet: bool) -> Self {
        Self {
            mobile,
            tablet,
            registry: CapabilityRegistry::new(),
        }
    }

    pub fn desktop() -> Self {
        Self::new(false, false)
    }

    pub fn phone() -> Self {
        Self::new(true, false)
    }

    pub fn tablet() -> Self {
        Self::new(true, true)
    }
}

impl DeviceClassifier for FixedClassifier {
    fn is_mobile(&self, _user_agent: &str) -> bool {
        self.mobile
    }

    fn is_tablet(&self, _user_agent: &str) -> bool {
        self.tablet
    }

    fn capabilities(&self) -> &CapabilityRegistry {
        &self.registry
    }
}

pub fn listener(config: Config, classifier: FixedClassifier) -> Arc<DeviceViewListener> {
    Arc::new(DeviceViewListener::new(Arc::new(config), Arc::new(classifier)))
}

pub fn app(config: Config, classifier: FixedClassifier) -> Router {
    build_router(listener(config, classifier))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("cookie", cookie)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(app: Router, req: Request<Body>) -> Response<Body> {
    app.oneshot(req).await.unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// All `Set-Cookie` values on a response.
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get("location")
        .map(|v| v.to_str().unwrap().to_string())
}

/// Redirect config with `kind` enabled on `host`.
pub fn redirect_to(config: &mut Config, kind: device_view::view::ViewKind, host: &str, action: &str) {
    let redirect = config.redirect.for_kind_mut(kind).unwrap();
    redirect.is_enabled = true;
    redirect.host = Some(host.to_string());
    redirect.action = action.to_string();
}
