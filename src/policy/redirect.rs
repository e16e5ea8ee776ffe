use url::form_urlencoded;

use crate::config::Config;
use crate::policy::{configured_origin, RedirectAction, RedirectDecision};
use crate::request::RequestInfo;
use crate::view::ViewKind;

/// Evaluates redirect configuration against a request.
///
/// Stateless: borrows the shared config for the duration of one decision.
#[derive(Debug, Clone, Copy)]
pub struct RedirectPolicy<'a> {
    config: &'a Config,
}

impl<'a> RedirectPolicy<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Redirect action for `route` and `kind`.
    ///
    /// A non-empty route-level option wins over the global action. A value
    /// that is not a known action yields `None`.
    pub fn routing_option(&self, route: Option<&str>, kind: ViewKind) -> Option<RedirectAction> {
        let route_option = route
            .and_then(|name| self.config.routes.get(name))
            .and_then(|options| options.get(kind));

        let option = match route_option {
            Some(option) => option,
            None => self.config.redirect.for_kind(kind)?.action.as_str(),
        };

        let action = RedirectAction::parse(option);
        if action.is_none() {
            tracing::trace!(route, %kind, option, "Ignoring unknown redirect action");
        }
        action
    }

    /// Whether `request` has to move to the dedicated host of `kind`.
    pub fn must_redirect(&self, request: &RequestInfo, kind: ViewKind) -> bool {
        let Some(redirect) = self.config.redirect.for_kind(kind) else {
            return false;
        };

        if !redirect.is_enabled {
            return false;
        }

        if self.routing_option(request.route(), kind) == Some(RedirectAction::NoRedirect) {
            return false;
        }

        // Already on the target host; redirecting again would loop.
        let target = redirect.host.as_deref().and_then(configured_origin);
        let on_target = match (target, request.origin()) {
            (Some(target), Some(current)) => target.eq_ignore_ascii_case(&current),
            _ => false,
        };

        !on_target
    }

    /// URL on the dedicated host of `kind`, carrying the switch-param hint.
    pub fn redirect_url(&self, request: &RequestInfo, kind: ViewKind) -> Option<String> {
        let host = self
            .config
            .redirect
            .for_kind(kind)?
            .host
            .as_deref()
            .filter(|h| !h.is_empty())?;
        let switch_param = self.config.switch_param.as_str();

        match self.routing_option(request.route(), kind)? {
            RedirectAction::Redirect => Some(format!(
                "{}{}?{}",
                host.trim_end_matches('/'),
                request.path(),
                request.query_with(switch_param, kind.as_str())
            )),
            RedirectAction::RedirectWithoutPath => {
                let hint = form_urlencoded::Serializer::new(String::new())
                    .append_pair(switch_param, kind.as_str())
                    .finish();
                Some(format!("{host}?{hint}"))
            }
            RedirectAction::NoRedirect => None,
        }
    }

    /// Both questions at once, with the configured status code.
    pub fn decide(&self, request: &RequestInfo, kind: ViewKind) -> RedirectDecision {
        let should_redirect = self.must_redirect(request, kind);
        RedirectDecision {
            should_redirect,
            target_url: should_redirect
                .then(|| self.redirect_url(request, kind))
                .flatten(),
            status_code: self.config.redirect.status_code(kind),
        }
    }
}
