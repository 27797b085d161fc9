//! wp-core: shared error type and configuration.
//!
//! Every other wp-* crate depends on this one. It provides the unified
//! [`Error`] taxonomy used to map failures onto HTTP responses and the
//! [`config::Config`] tree that is built once at startup.

pub mod config;
pub mod error;

pub use error::{Error, Result};
