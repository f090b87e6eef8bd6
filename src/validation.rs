use crate::error::{Result, Error};

pub fn validate_api_key(api_key: &str) -> Result<()> {
    if api_key.trim().is_empty() {
        return Err(Error::ConfigError("CoinMarketCap API key is not set (use CMC_API)".to_string()));
    }
    Ok(())
}

pub fn validate_api_url(url: &str) -> Result<()> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(Error::ConfigError(format!("API url must be http(s): {}", url)));
    }
    Ok(())
}

pub fn validate_interval(interval_secs: u64) -> Result<()> {
    if interval_secs == 0 {
        return Err(Error::ConfigError("Polling interval must be positive".to_string()));
    }
    Ok(())
}

/// Collection names are interpolated into SQL, so only plain identifiers pass.
pub fn validate_collection_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::ValidationError(format!("Invalid collection name: '{}'", name)));
    }
    if name.len() > 63 {
        return Err(Error::ValidationError("Collection name is too long".to_string()));
    }
    Ok(())
}
