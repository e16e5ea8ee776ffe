//! Device view detection and redirection for HTTP services.
//!
//! A request is resolved to a [`view::ViewKind`] (switch parameter, then
//! cookie, then user-agent detection), optionally redirected to a host
//! dedicated to that view, and the choice is persisted in a cookie.

pub mod config;
pub mod detect;
pub mod listener;
pub mod logging;
pub mod policy;
pub mod presentation;
pub mod request;
pub mod server;
pub mod view;
