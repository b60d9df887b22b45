//! Request-scoped context extracted ahead of handlers.

pub mod session;

pub use session::{Session, SessionSettings, SESSION_COOKIE_NAME};
