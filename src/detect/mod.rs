//! User-agent classification.
//!
//! The device view logic only needs "is this a phone" and "is this a
//! tablet"; everything else is exposed as named capabilities for templates.

mod capabilities;
mod classifier;

pub use capabilities::CapabilityRegistry;
pub use classifier::{DeviceClassifier, DeviceDetector, KeywordClassifier};
