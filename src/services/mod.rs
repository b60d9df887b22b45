//! Business logic: account signup.

pub mod account;

pub use account::{AccountService, SignupForm};
