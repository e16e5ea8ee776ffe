use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The audience-targeted rendering mode of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Mobile,
    Tablet,
    Full,
    /// No request context (CLI, background jobs). Never transitions.
    NotMobile,
}

impl ViewKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ViewKind::Mobile => "mobile",
            ViewKind::Tablet => "tablet",
            ViewKind::Full => "full",
            ViewKind::NotMobile => "not_mobile",
        }
    }

    /// Interpret a token sent by the client (switch param or cookie).
    ///
    /// Case-sensitive. `not_mobile` is reserved for the absence of a
    /// request and is rejected like any other unknown token.
    pub fn from_client_token(token: &str) -> Option<Self> {
        match token.parse::<ViewKind>() {
            Ok(ViewKind::NotMobile) | Err(_) => None,
            Ok(kind) => Some(kind),
        }
    }

    /// Apply the detect-tablet-as-mobile fold.
    pub const fn fold_tablet(self, detect_tablet_as_mobile: bool) -> Self {
        match self {
            ViewKind::Tablet if detect_tablet_as_mobile => ViewKind::Mobile,
            other => other,
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownViewKind(pub String);

impl fmt::Display for UnknownViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown device view '{}'", self.0)
    }
}

impl std::error::Error for UnknownViewKind {}

impl FromStr for ViewKind {
    type Err = UnknownViewKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mobile" => Ok(ViewKind::Mobile),
            "tablet" => Ok(ViewKind::Tablet),
            "full" => Ok(ViewKind::Full),
            "not_mobile" => Ok(ViewKind::NotMobile),
            other => Err(UnknownViewKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_tokens_are_case_sensitive() {
        assert_eq!(ViewKind::from_client_token("tablet"), Some(ViewKind::Tablet));
        assert_eq!(ViewKind::from_client_token("Tablet"), None);
        assert_eq!(ViewKind::from_client_token("not_mobile"), None);
    }

    #[test]
    fn test_fold_only_touches_tablet() {
        assert_eq!(ViewKind::Tablet.fold_tablet(true), ViewKind::Mobile);
        assert_eq!(ViewKind::Tablet.fold_tablet(false), ViewKind::Tablet);
        assert_eq!(ViewKind::Full.fold_tablet(true), ViewKind::Full);
    }
}
