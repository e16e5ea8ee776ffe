use std::fmt;

use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use chrono::{DateTime, Utc};
use url::form_urlencoded;

use crate::config::{CookieConfig, ExpiryModifier, SameSite};
use crate::view::ViewKind;

const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// The device view cookie, rendered as a `Set-Cookie` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewCookie {
    name: String,
    value: String,
    expires: DateTime<Utc>,
    max_age: i64,
    path: String,
    domain: Option<String>,
    secure: bool,
    http_only: bool,
    raw: bool,
    same_site: SameSite,
}

impl ViewCookie {
    /// Build the cookie for `kind` issued at `now`.
    ///
    /// An unparseable expiry modifier falls back to one month.
    pub fn new(config: &CookieConfig, kind: ViewKind, now: DateTime<Utc>) -> Self {
        let expires = ExpiryModifier::expires_at(&config.expire_datetime_modifier, now);
        Self {
            name: config.key.clone(),
            value: kind.as_str().to_owned(),
            expires,
            max_age: (expires - now).num_seconds().max(0),
            path: config.path.clone(),
            domain: Some(config.domain.clone()).filter(|d| !d.is_empty()),
            secure: config.secure,
            http_only: config.http_only,
            raw: config.raw,
            same_site: config.same_site,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires(&self) -> DateTime<Utc> {
        self.expires
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    pub fn same_site(&self) -> SameSite {
        self.same_site
    }

    /// Set this cookie on `headers`, replacing a previous cookie of the
    /// same name so repeated calls leave a single entry.
    pub fn apply_to(&self, headers: &mut HeaderMap) -> Result<(), axum::http::header::InvalidHeaderValue> {
        let value = HeaderValue::try_from(self.to_string())?;
        let prefix = format!("{}=", self.name);

        let others: Vec<HeaderValue> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter(|v| !v.as_bytes().starts_with(prefix.as_bytes()))
            .cloned()
            .collect();

        headers.remove(SET_COOKIE);
        for other in others {
            headers.append(SET_COOKIE, other);
        }
        headers.append(SET_COOKIE, value);
        Ok(())
    }
}

impl fmt::Display for ViewCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        f.write_str("=")?;
        if self.raw {
            f.write_str(&self.value)?;
        } else {
            for chunk in form_urlencoded::byte_serialize(self.value.as_bytes()) {
                f.write_str(chunk)?;
            }
        }
        write!(f, "; Expires={}", self.expires.format(IMF_FIXDATE))?;
        write!(f, "; Max-Age={}", self.max_age)?;
        write!(f, "; Path={}", self.path)?;
        if let Some(domain) = &self.domain {
            write!(f, "; Domain={domain}")?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        write!(f, "; SameSite={}", self.same_site)
    }
}
