//! `config check` - validate the deployed environment configuration.

use meridian_backoffice::config::{BackofficeConfig, ConfigError};

/// Loads the environment configuration and prints a redacted summary.
///
/// # Errors
///
/// Returns the underlying `ConfigError` when validation fails, so the
/// operator sees exactly which variable is missing or insecure.
pub fn check() -> Result<(), ConfigError> {
    let config = BackofficeConfig::from_env()?;

    println!("configuration OK");
    println!("  bind address:        {}", config.socket_addr());
    println!("  base url:            {}", config.base_url);
    println!("  primary admin:       {}", config.primary_admin_email);
    println!("  data dir:            {}", config.data_dir.display());
    println!("  ai model:            {}", config.ai.model);
    println!(
        "  ai key:              {}",
        source_label(config.ai.api_key.is_some())
    );
    println!("  image model:         {}", config.image.model);
    println!(
        "  image key:           {}",
        source_label(config.image.api_key.is_some())
    );
    println!(
        "  whatsapp phone id:   {}",
        config
            .whatsapp
            .phone_number_id
            .as_deref()
            .unwrap_or("(not set)")
    );
    println!(
        "  whatsapp token:      {}",
        source_label(config.whatsapp.access_token.is_some())
    );
    println!(
        "  rate limit:          {} requests / {}s",
        config.rate_limit.max_requests, config.rate_limit.window_secs
    );
    println!(
        "  sentry:              {}",
        source_label(config.sentry_dsn.is_some())
    );

    Ok(())
}

const fn source_label(present: bool) -> &'static str {
    if present { "set (redacted)" } else { "(not set)" }
}
