//! Data Transfer Objects
//!
//! Request and response bodies that are not domain types themselves.

pub mod auth;
pub mod common;
pub mod market;

pub use auth::*;
pub use common::*;
pub use market::*;
