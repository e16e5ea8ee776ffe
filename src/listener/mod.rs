//! Request/response hooks that resolve the device view, redirect to
//! dedicated hosts and persist the view in a cookie.

mod layer;
mod orchestrator;

pub use layer::{DeviceViewLayer, DeviceViewService};
pub use orchestrator::{DeviceViewListener, PendingModification, RequestOutcome};
