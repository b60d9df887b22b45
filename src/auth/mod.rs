//! Authentication: signup, login, logout, password hashing.

mod handlers;
mod service;

pub use handlers::{login_page, login_submit, logout, signup, signup_page, LoginPageForm, INVALID_CREDENTIALS};
pub use service::AuthAppService;
