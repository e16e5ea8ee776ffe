use std::sync::Arc;

use axum::extract::{Request, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Extension, Json, Router};

use crate::listener::{DeviceViewLayer, DeviceViewListener};
use crate::presentation::{DeviceDataCollector, DeviceDataSnapshot, ViewHelpers};
use crate::server::health::health;
use crate::view::ViewState;

/// Demo application wrapped in the device view layer.
///
/// `/health` sits outside the layer so probes never get redirected.
pub fn build_router(listener: Arc<DeviceViewListener>) -> Router {
    let app = Router::new()
        .route("/", get(page))
        .route("/some/parameters", get(page))
        .route("/_device_view", get(debug_panel))
        .layer(DeviceViewLayer::new(listener.clone()))
        .with_state(listener);

    Router::new().route("/health", get(health)).merge(app)
}

async fn page(
    State(listener): State<Arc<DeviceViewListener>>,
    Extension(state): Extension<ViewState>,
    req: Request,
) -> Html<String> {
    let info = listener.request_info(&req);
    let helpers = ViewHelpers::new(&state, Some(&info), listener.classifier().as_ref());

    let view = state.current().map(|v| v.as_str()).unwrap_or("unresolved");
    let full_link = helpers
        .full_view_url(true)
        .map(|url| format!("<p><a href=\"{url}\">Full site</a></p>"))
        .unwrap_or_default();

    Html(format!(
        "<!DOCTYPE html><html><body>\
         <h1>{view} view</h1>\
         <p>mobile device: {}, tablet device: {}</p>\
         {full_link}\
         </body></html>",
        helpers.is_mobile(),
        helpers.is_tablet(),
    ))
}

async fn debug_panel(
    State(listener): State<Arc<DeviceViewListener>>,
    Extension(state): Extension<ViewState>,
    req: Request,
) -> Json<DeviceDataSnapshot> {
    let info = listener.request_info(&req);
    Json(DeviceDataCollector::collect(&state, &info))
}
