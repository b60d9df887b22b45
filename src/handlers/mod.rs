//! HTTP request handlers: pages and shared plumbing.

pub mod http;
pub mod pages;

pub use http::*;
pub use pages::*;
