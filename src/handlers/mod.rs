//! HTTP handlers shared across route groups.

pub mod http;

pub use http::*;
