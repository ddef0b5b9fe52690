//! Subcommand implementations.

pub mod ask;
pub mod doctor;
pub mod gateway;
pub mod onboard;
pub mod study;

use anyhow::Context;
use rustedtutor_config::AppConfig;
use rustedtutor_tutor::Tutor;

pub fn load_config() -> anyhow::Result<AppConfig> {
    AppConfig::load().context("Failed to load config")
}

/// Load config and build a tutor, refusing early when no key is set.
pub fn build_tutor() -> anyhow::Result<(AppConfig, Tutor)> {
    let config = load_config()?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    OPENAI_API_KEY       = 'sk-...'");
        eprintln!("    RUSTEDTUTOR_API_KEY  = 'sk-...'");
        eprintln!("    AZURE_OPENAI_API_KEY (with AZURE_OPENAI_API_BASE and AZURE_OPENAI_API_NAME)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        anyhow::bail!("No API key found. See above for setup instructions.");
    }

    let tutor = Tutor::from_config(&config).context("Failed to initialize tutor")?;
    Ok((config, tutor))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
