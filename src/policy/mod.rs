//! Per-view redirect policy: whether a request must move to a dedicated
//! host, and the exact URL it moves to.

mod redirect;

use std::fmt;

use axum::http::StatusCode;
use serde::Serialize;
use url::Url;

pub use redirect::RedirectPolicy;

/// How a route treats a view's dedicated host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectAction {
    /// Keep path and query, add the switch-param hint.
    Redirect,
    /// Bare host plus the switch-param hint.
    RedirectWithoutPath,
    /// Never redirect, whatever the global policy says.
    NoRedirect,
}

impl RedirectAction {
    /// Parse a configured action; `None` for anything unrecognized.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "redirect" => Some(RedirectAction::Redirect),
            "redirect_without_path" => Some(RedirectAction::RedirectWithoutPath),
            "no_redirect" => Some(RedirectAction::NoRedirect),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            RedirectAction::Redirect => "redirect",
            RedirectAction::RedirectWithoutPath => "redirect_without_path",
            RedirectAction::NoRedirect => "no_redirect",
        }
    }
}

impl fmt::Display for RedirectAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating the policy for one request and view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectDecision {
    pub should_redirect: bool,
    pub target_url: Option<String>,
    pub status_code: StatusCode,
}

impl RedirectDecision {
    /// The target, only when a redirect is both warranted and possible.
    pub fn target(&self) -> Option<&str> {
        self.target_url.as_deref().filter(|_| self.should_redirect)
    }
}

/// `scheme://host[:port]` of a configured redirect host, default port
/// omitted, in the form [`RequestInfo::origin`](crate::request::RequestInfo::origin)
/// produces. `None` when the host is not an absolute URL.
pub(crate) fn configured_origin(host: &str) -> Option<String> {
    let origin = Url::parse(host).ok()?.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}
