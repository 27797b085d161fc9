//! Route handlers for the HTTP API.

pub mod convert;
pub mod debug;
pub mod health;
