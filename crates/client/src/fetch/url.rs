//! Fetch target validation.

/// Error type for fetch target validation failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("missing host: {0}")]
    MissingHost(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse a fetch target.
///
/// The URL must be absolute `http` or `https` with a host. Surrounding
/// whitespace and any fragment are dropped; the path and query are kept
/// verbatim.
pub fn parse_target(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlError::MissingHost(trimmed.to_string()));
    }

    parsed.set_fragment(None);

    Ok(parsed)
}
