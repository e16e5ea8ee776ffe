//! Read-only projections of the device view for templates and debugging.

mod collector;
mod helpers;

pub use collector::{DeviceDataCollector, DeviceDataSnapshot, ViewEntry};
pub use helpers::ViewHelpers;
