//! Business logic: the account and credential lifecycle.

pub mod account;

pub use account::{AccountService, Registration, Session};
