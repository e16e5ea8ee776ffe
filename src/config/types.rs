use std::collections::BTreeMap;
use std::fmt;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::view::ViewKind;

/// Root configuration container.
///
/// Built once at startup and shared (behind an `Arc`) with every
/// request-scoped [`ViewState`](crate::view::ViewState).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub redirect: RedirectConfig,
    #[serde(default)]
    pub switch_device_view: SwitchDeviceViewConfig,
    #[serde(flatten)]
    pub cookie: CookieConfig,
    /// Query parameter used for explicit view switching.
    #[serde(default = "default_switch_param")]
    pub switch_param: String,
    /// Take the request scheme from `X-Forwarded-Proto` when the URI has
    /// none. Enable only behind a proxy that sets that header itself.
    #[serde(default)]
    pub trust_forwarded_proto: bool,
    /// Route-level redirect overrides, keyed by route path (e.g. "/checkout").
    #[serde(default)]
    pub routes: BTreeMap<String, RouteOptions>,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Per-view redirect policy plus the tablet fold flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectConfig {
    #[serde(default)]
    pub mobile: ViewRedirect,
    #[serde(default)]
    pub tablet: ViewRedirect,
    #[serde(default)]
    pub full: ViewRedirect,
    /// Collapse the tablet classification into mobile.
    #[serde(default)]
    pub detect_tablet_as_mobile: bool,
}

/// Redirect settings for a single view kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRedirect {
    #[serde(default)]
    pub is_enabled: bool,
    /// Absolute base URL of the dedicated host (e.g. "http://m.example.com").
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_status_code")]
    pub status_code: u16,
    /// One of "redirect", "redirect_without_path", "no_redirect".
    /// Other values are kept as-is and disable redirection at lookup time.
    #[serde(default = "default_action")]
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchDeviceViewConfig {
    /// Keep path and query when redirecting after a switch.
    #[serde(default = "default_true")]
    pub save_referer_path: bool,
}

/// Attributes of the device view cookie.
///
/// Flattened into the root config, so the keys read `cookie_key`,
/// `cookie_path` and so on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    #[serde(rename = "cookie_key", default = "default_cookie_key")]
    pub key: String,
    #[serde(rename = "cookie_path", default = "default_cookie_path")]
    pub path: String,
    /// Empty means "current host" (no Domain attribute).
    #[serde(rename = "cookie_domain", default)]
    pub domain: String,
    #[serde(rename = "cookie_secure", default)]
    pub secure: bool,
    #[serde(rename = "cookie_httpOnly", alias = "cookie_http_only", default = "default_true")]
    pub http_only: bool,
    /// Write the value without URL-encoding.
    #[serde(rename = "cookie_raw", default)]
    pub raw: bool,
    #[serde(rename = "cookie_samesite", default)]
    pub same_site: SameSite,
    /// Relative duration expression such as "1 month" or "+2 weeks".
    #[serde(
        rename = "cookie_expire_datetime_modifier",
        default = "default_expire_modifier"
    )]
    pub expire_datetime_modifier: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    #[default]
    Lax,
    Strict,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
            SameSite::None => "None",
        })
    }
}

/// Route-level overrides; each value is an action string like
/// [`ViewRedirect::action`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOptions {
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub tablet: Option<String>,
    #[serde(default)]
    pub full: Option<String>,
}

/// Demo server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP server (host:port).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_switch_param() -> String {
    "device_view".to_string()
}

fn default_status_code() -> u16 {
    302
}

fn default_action() -> String {
    "redirect".to_string()
}

fn default_true() -> bool {
    true
}

fn default_cookie_key() -> String {
    "device_view".to_string()
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn default_expire_modifier() -> String {
    "1 month".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

impl RedirectConfig {
    /// Redirect settings for `kind`; `None` for [`ViewKind::NotMobile`].
    pub fn for_kind(&self, kind: ViewKind) -> Option<&ViewRedirect> {
        match kind {
            ViewKind::Mobile => Some(&self.mobile),
            ViewKind::Tablet => Some(&self.tablet),
            ViewKind::Full => Some(&self.full),
            ViewKind::NotMobile => None,
        }
    }

    pub fn for_kind_mut(&mut self, kind: ViewKind) -> Option<&mut ViewRedirect> {
        match kind {
            ViewKind::Mobile => Some(&mut self.mobile),
            ViewKind::Tablet => Some(&mut self.tablet),
            ViewKind::Full => Some(&mut self.full),
            ViewKind::NotMobile => None,
        }
    }

    /// Configured status code for `kind`, or 302 Found.
    pub fn status_code(&self, kind: ViewKind) -> StatusCode {
        self.for_kind(kind)
            .and_then(|r| StatusCode::from_u16(r.status_code).ok())
            .unwrap_or(StatusCode::FOUND)
    }
}

impl RouteOptions {
    /// The declared option for `kind`, ignoring empty strings.
    pub fn get(&self, kind: ViewKind) -> Option<&str> {
        let option = match kind {
            ViewKind::Mobile => self.mobile.as_deref(),
            ViewKind::Tablet => self.tablet.as_deref(),
            ViewKind::Full => self.full.as_deref(),
            ViewKind::NotMobile => None,
        };
        option.filter(|o| !o.is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redirect: RedirectConfig::default(),
            switch_device_view: SwitchDeviceViewConfig::default(),
            cookie: CookieConfig::default(),
            switch_param: default_switch_param(),
            trust_forwarded_proto: false,
            routes: BTreeMap::new(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            mobile: ViewRedirect::default(),
            tablet: ViewRedirect::default(),
            full: ViewRedirect::default(),
            detect_tablet_as_mobile: false,
        }
    }
}

impl Default for ViewRedirect {
    fn default() -> Self {
        Self {
            is_enabled: false,
            host: None,
            status_code: default_status_code(),
            action: default_action(),
        }
    }
}

impl Default for SwitchDeviceViewConfig {
    fn default() -> Self {
        Self {
            save_referer_path: true,
        }
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            key: default_cookie_key(),
            path: default_cookie_path(),
            domain: String::new(),
            secure: false,
            http_only: true,
            raw: false,
            same_site: SameSite::default(),
            expire_datetime_modifier: default_expire_modifier(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}
