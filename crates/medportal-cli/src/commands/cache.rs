use anyhow::{Context, Result};
use medportal_cache::{CacheConfig, cache_key, ttl_millis};
use serde_json::{Map, Value, json};

use crate::cli::OutputFormat;
use crate::output;

pub fn key(endpoint: &str, params: Option<&str>, format: OutputFormat) -> Result<String> {
    let params: Option<Value> = params
        .map(serde_json::from_str)
        .transpose()
        .context("--params must be valid JSON")?;
    let key = cache_key(endpoint, params.as_ref());

    match format {
        OutputFormat::Json => output::print_json(&json!({ "key": key }))?,
        OutputFormat::Table => println!("{key}"),
    }
    Ok(key)
}

pub fn ttls(config: &CacheConfig, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let mut resources = Map::new();
            for (class, ttl) in config.resources.iter() {
                resources.insert(
                    class.to_string(),
                    json!({ "endpoint": class.endpoint(), "ttl_ms": ttl_millis(ttl) }),
                );
            }
            output::print_json(&json!({
                "enabled": config.enabled,
                "default_ttl_ms": ttl_millis(config.default_ttl),
                "resources": resources,
            }))?;
        }
        OutputFormat::Table => {
            output::print_table(
                ["Resource", "Endpoint", "TTL"],
                config.resources.iter().map(|(class, ttl)| {
                    [
                        class.to_string(),
                        class.endpoint().to_string(),
                        humantime::format_duration(ttl).to_string(),
                    ]
                }),
            );
            println!(
                "default: {} (cache {})",
                humantime::format_duration(config.default_ttl),
                if config.enabled { "enabled" } else { "disabled" }
            );
        }
    }
    Ok(())
}
