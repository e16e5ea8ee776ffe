pub mod expiry;
pub mod loader;
pub mod types;

pub use expiry::{ExpiryModifier, ExpiryUnit};
pub use loader::ConfigError;
pub use types::{
    Config, CookieConfig, RedirectConfig, RouteOptions, SameSite, ServerConfig,
    SwitchDeviceViewConfig, ViewRedirect,
};
