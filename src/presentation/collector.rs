use serde::Serialize;

use crate::config::Config;
use crate::policy::{configured_origin, RedirectAction};
use crate::request::RequestInfo;
use crate::view::{ResolutionSource, ViewKind, ViewState};

/// Debug-panel snapshot of the device view for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDataSnapshot {
    pub current_view: Option<ViewKind>,
    pub source: Option<ResolutionSource>,
    pub views: Vec<ViewEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewEntry {
    pub kind: ViewKind,
    pub label: &'static str,
    /// Current URL with the switch parameter forced to this view.
    pub link: String,
    pub is_current: bool,
    /// False when switching here would bounce the user to another host.
    pub enabled: bool,
}

pub struct DeviceDataCollector;

impl DeviceDataCollector {
    pub fn collect(state: &ViewState, request: &RequestInfo) -> DeviceDataSnapshot {
        let config = state.config();
        let current_host = request.scheme_and_http_host();

        let views = [
            (ViewKind::Full, "Full"),
            (ViewKind::Tablet, "Tablet"),
            (ViewKind::Mobile, "Mobile"),
        ]
        .into_iter()
        .map(|(kind, label)| ViewEntry {
            kind,
            label,
            link: request.url_with_query(&request.query_with(&config.switch_param, kind.as_str())),
            is_current: state.current() == Some(kind),
            enabled: can_use_view(config, kind, &current_host),
        })
        .collect();

        DeviceDataSnapshot {
            current_view: state.current(),
            source: state.source(),
            views,
        }
    }
}

fn can_use_view(config: &Config, kind: ViewKind, current_host: &str) -> bool {
    let Some(redirect) = config.redirect.for_kind(kind) else {
        return true;
    };
    if !redirect.is_enabled {
        return true;
    }

    let redirects_away = matches!(
        RedirectAction::parse(&redirect.action),
        Some(RedirectAction::Redirect | RedirectAction::RedirectWithoutPath)
    );
    let Some(host) = redirect.host.as_deref().filter(|h| !h.is_empty()) else {
        return true;
    };
    if !redirects_away {
        return true;
    }

    configured_origin(host).map_or(true, |origin| origin == current_host)
}
