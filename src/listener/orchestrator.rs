use std::sync::Arc;

use axum::http::Request;
use axum::response::Response;
use serde::Serialize;

use crate::config::Config;
use crate::detect::{DeviceClassifier, DeviceDetector};
use crate::policy::RedirectPolicy;
use crate::request::RequestInfo;
use crate::view::{ResolutionSource, ViewCookie, ViewKind, ViewState};

/// Cookie work deferred until the inner service has produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingModification {
    pub view: ViewKind,
    pub reason: ResolutionSource,
}

/// Result of the request phase.
#[derive(Debug)]
pub struct RequestOutcome {
    pub state: ViewState,
    /// Short-circuit response; the inner service must not run.
    pub redirect: Option<Response>,
    /// Cookie to stamp onto the eventual response.
    pub pending: Option<PendingModification>,
}

impl RequestOutcome {
    fn pass(state: ViewState) -> Self {
        Self {
            state,
            redirect: None,
            pending: None,
        }
    }

    pub fn needs_response_modification(&self) -> bool {
        self.pending.is_some()
    }
}

/// Two-phase device view handling around an inner service.
///
/// Holds no per-request state: each call to
/// [`handle_request`](Self::handle_request) builds its own [`ViewState`].
pub struct DeviceViewListener {
    config: Arc<Config>,
    classifier: Arc<dyn DeviceClassifier>,
}

impl DeviceViewListener {
    pub fn new(config: Arc<Config>, classifier: Arc<dyn DeviceClassifier>) -> Self {
        Self { config, classifier }
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn classifier(&self) -> &Arc<dyn DeviceClassifier> {
        &self.classifier
    }

    /// Snapshot `req`, honouring `X-Forwarded-Proto` only when configured.
    pub fn request_info<B>(&self, req: &Request<B>) -> RequestInfo {
        if self.config.trust_forwarded_proto {
            RequestInfo::from_proxied_request(req)
        } else {
            RequestInfo::from_request(req)
        }
    }

    /// Request phase: either a redirect, a pending cookie, or nothing.
    pub fn handle_request(&self, request: &RequestInfo) -> RequestOutcome {
        let mut state = ViewState::new(self.config.clone(), Some(request));

        // Sub-requests inherit whatever the main request decided.
        if !request.is_main_request() || state.is_not_mobile_view() {
            return RequestOutcome::pass(state);
        }

        let mut detector = DeviceDetector::new(self.classifier.as_ref());
        detector.set_user_agent(request.user_agent());
        let policy = RedirectPolicy::new(&self.config);

        if state.has_switch_param() {
            let redirect = self.switch_param_redirect(&state, &policy, request);
            return RequestOutcome {
                state,
                redirect,
                pending: None,
            };
        }

        let explicit = state.requested().is_some();
        if !explicit {
            let fold = self.config.redirect.detect_tablet_as_mobile;
            if !fold && detector.is_tablet() {
                state.set_tablet_view();
            } else if detector.is_mobile() || (fold && detector.is_tablet()) {
                state.set_mobile_view();
            } else {
                state.set_full_view();
            }
        }

        let view = state.current().unwrap_or(ViewKind::Full);
        tracing::debug!(
            %view,
            source = ?state.source(),
            path = request.path(),
            "Resolved device view"
        );

        let decision = policy.decide(request, view);
        if decision.should_redirect {
            let redirect = decision.target().and_then(|url| {
                tracing::info!(%view, target = url, "Redirecting to device host");
                state.redirect_response(view, url, decision.status_code)
            });
            return RequestOutcome {
                state,
                redirect,
                pending: None,
            };
        }

        // The client already holds a matching cookie.
        if explicit {
            return RequestOutcome::pass(state);
        }

        RequestOutcome {
            state,
            redirect: None,
            pending: Some(PendingModification {
                view,
                reason: ResolutionSource::Detection,
            }),
        }
    }

    /// Response phase: stamp the pending cookie, if any.
    pub fn handle_response(
        &self,
        mut response: Response,
        pending: Option<PendingModification>,
    ) -> Response {
        let Some(pending) = pending else {
            return response;
        };
        if pending.view == ViewKind::NotMobile {
            return response;
        }

        let cookie = ViewCookie::new(&self.config.cookie, pending.view, chrono::Utc::now());
        if let Err(e) = cookie.apply_to(response.headers_mut()) {
            tracing::warn!("Cannot attach device view cookie: {e}");
        }
        response
    }

    /// One-hop redirect after an explicit switch: straight to the policy
    /// target if the new view needs one, else back to the current page
    /// without the switch parameter.
    fn switch_param_redirect(
        &self,
        state: &ViewState,
        policy: &RedirectPolicy<'_>,
        request: &RequestInfo,
    ) -> Option<Response> {
        let view = state.switch_target().unwrap_or(ViewKind::Full);
        let decision = policy.decide(request, view);

        let url = match decision.target() {
            Some(target) => target.to_owned(),
            None if self.config.switch_device_view.save_referer_path => {
                request.url_with_query(&request.query_without(&self.config.switch_param))
            }
            None => request.root_url(),
        };

        tracing::info!(%view, target = %url, "Switching device view");
        state.redirect_response_by_switch_param(&url)
    }
}
