//! Init command implementation

use super::prompt::{prompt_string, stdin_is_tty};
use crate::config::{suggested_api_base_url, validate_api_base_url, Config};
use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct InitOptions {
    pub config_path: PathBuf,
    pub api_url: Option<String>,
    pub force: bool,
}

/// Write a config file pointing at the backend
pub async fn cmd_init(options: InitOptions) -> Result<Config> {
    let InitOptions {
        config_path,
        api_url,
        force,
    } = options;

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Config already exists at {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    let api_url = match api_url {
        Some(url) => url,
        None if stdin_is_tty() => prompt_string("Backend API base URL", &suggested_api_base_url(), |value| {
            validate_api_base_url(value).map_err(|e| e.to_string())
        })?,
        None => suggested_api_base_url(),
    };

    let config = Config {
        api_base_url: Some(api_url),
        config_file: config_path,
        ..Config::default()
    };
    config.validate()?;
    config.save()?;
    info!("Created config at {:?}", config.config_file);

    Ok(config)
}

pub fn print_init_summary(config: &Config) {
    println!("✓ Wrote {}", config.config_file.display());
    println!(
        "\nBackend: {}",
        config.api_base_url.as_deref().unwrap_or_default()
    );
    println!("\nNext steps:");
    println!("  docqa list                      # Show uploaded documents");
    println!("  docqa upload ./report.pdf       # Upload a document");
    println!("  docqa                           # Open the interactive shell");
}
