use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "webpd")]
#[command(author, version, about = "HTTP service that converts uploaded images to WebP with cwebp")]
pub struct Cli {
    /// Path to a JSON config file
    #[arg(short, long, global = true, env = "WEBPD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root of the libwebp install tree (the encoder is <path>/bin/cwebp)
    #[arg(long, global = true, env = "LIBWEBP_PATH")]
    pub libwebp_path: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the conversion server
    Start {
        /// Host to bind to
        #[arg(long, env = "WEBPD_HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Expose GET /debug with encoder diagnostics
        #[arg(long)]
        debug_endpoint: bool,
    },

    /// Show where the encoder resolves to and its version
    CheckEncoder,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses --config if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
