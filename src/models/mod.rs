//! Data models for student accounts.

pub mod account;

pub use account::*;
