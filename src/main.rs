mod cli;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use wp_core::config::Config;
use wp_encoder::{EncoderLocator, EncoderReport};

/// Load the config file (or defaults) and apply the global overrides.
fn load_config(config_path: Option<&Path>, libwebp_path: Option<&Path>) -> Config {
    let mut config = Config::load_or_default(config_path);

    if let Some(path) = libwebp_path {
        config.encoder.install_path = Some(path.to_path_buf());
    }

    config
}

async fn start_server(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
    debug_endpoint: bool,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if debug_endpoint {
        config.server.debug_endpoint = true;
    }

    tracing::info!("Starting webpd");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    wp_server::start(config).await?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise the verbose flag picks the default filter.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "webpd=debug,wp_server=debug,wp_encoder=debug,wp_core=debug,tower_http=debug"
                .to_string()
        } else {
            "webpd=info,wp_server=info,wp_encoder=info,wp_core=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start {
            host,
            port,
            debug_endpoint,
        } => {
            let config = load_config(cli.config.as_deref(), cli.libwebp_path.as_deref());
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(config, host, port, debug_endpoint))
        }
        Commands::CheckEncoder => {
            let config = load_config(cli.config.as_deref(), cli.libwebp_path.as_deref());
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(check_encoder(&config))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("webpd {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn check_encoder(config: &Config) -> Result<()> {
    println!("Checking encoder...\n");

    let locator = EncoderLocator::from_config(&config.encoder);
    let report = EncoderReport::collect(&locator).await;

    let status = if report.exists { "✓" } else { "✗" };
    print!("{} {}", status, report.encoder_path);
    if let Some(ref version) = report.version {
        print!(" ({})", version);
    }
    if let Some(ref resolved) = report.resolved {
        print!(" - {}", resolved);
    }
    println!();

    if let Some(ref info) = report.file_info {
        println!("  {}", info);
    }
    if let Some(ref contents) = report.install_contents {
        println!("  Install contents: {}", contents.join(", "));
    }
    if let Some(ref contents) = report.bin_contents {
        println!("  Bin contents: {}", contents.join(", "));
    }

    println!();
    match report.resolution_error {
        None => {
            println!("Encoder is available!");
            Ok(())
        }
        Some(error) => {
            anyhow::bail!("Encoder is not available: {}", error)
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = Config::from_file(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("  Server: {}:{}", config.server.host, config.server.port);
    match config.server.max_upload_bytes {
        Some(max) => println!("  Max upload bytes: {}", max),
        None => println!("  Max upload bytes: unlimited"),
    }
    println!("  Debug endpoint: {}", config.server.debug_endpoint);
    match config.encoder.install_path {
        Some(ref path) => println!("  Encoder install path: {}", path.display()),
        None => println!("  Encoder command: {}", config.encoder.command.display()),
    }
    println!("  Default quality: {}", config.encoder.default_quality);
    println!("  Timeout: {}s", config.encoder.timeout_secs);

    let warnings = config.validate();
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &warnings {
            println!("  - {}", warning);
        }
    }

    println!(
        "\n{}",
        serde_json::to_string_pretty(&config).unwrap_or_default()
    );

    Ok(())
}
