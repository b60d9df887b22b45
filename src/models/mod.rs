//! Data models for users, wallets, and sessions.

pub mod session;
pub mod user;
pub mod wallet;

pub use session::*;
pub use user::*;
pub use wallet::*;
