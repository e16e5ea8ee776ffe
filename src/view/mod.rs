//! Per-request device view state and the cookie that persists it.

mod cookie;
mod kind;
mod state;

pub use cookie::ViewCookie;
pub use kind::{UnknownViewKind, ViewKind};
pub use state::{ResolutionSource, ViewState};
