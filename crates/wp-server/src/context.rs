//! Shared application context.
//!
//! [`AppContext`] is handed to every route handler through Axum state. It is
//! built once at startup and never mutated: the configuration, the encoder
//! lookup rules, and the converter used for `/convert`.

use std::sync::Arc;

use wp_core::config::Config;
use wp_encoder::{Converter, CwebpConverter, EncoderLocator, Quality};

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    /// Encoder lookup rules (used by `/debug`).
    pub locator: Arc<EncoderLocator>,
    /// Performs conversions for `/convert`.
    pub converter: Arc<dyn Converter>,
    /// Quality applied when a request does not specify one.
    pub default_quality: Quality,
}

impl AppContext {
    /// Build a context that converts with `cwebp`.
    pub fn new(config: Config) -> Self {
        let converter = Arc::new(CwebpConverter::from_config(&config.encoder));
        Self::with_converter(config, converter)
    }

    /// Build a context around a caller-supplied converter.
    pub fn with_converter(config: Config, converter: Arc<dyn Converter>) -> Self {
        let default_quality = Quality::new(config.encoder.default_quality).unwrap_or_default();
        Self {
            locator: Arc::new(EncoderLocator::from_config(&config.encoder)),
            config: Arc::new(config),
            converter,
            default_quality,
        }
    }
}
