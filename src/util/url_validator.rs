use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Errors that can occur while validating configured endpoints and owner ids.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// Plain HTTP pointed at a non-loopback host.
    #[error("Insecure endpoint: HTTPS required (except localhost for testing)")]
    Insecure,
    /// The feed owner id cannot be used as a feed path segment.
    #[error("Invalid feed owner id: {0:?}")]
    InvalidOwner(String),
}

/// Validates a configured endpoint (feed base, profile base or proxy).
///
/// HTTPS is required. Plain HTTP is accepted only for loopback hosts so that
/// tests can point the service at a local mock server.
///
/// # Examples
///
/// ```
/// use inkfeed::util::validate_endpoint;
///
/// assert!(validate_endpoint("https://medium.com/feed").is_ok());
/// assert!(validate_endpoint("http://127.0.0.1:8080/raw?url=").is_ok());
/// assert!(validate_endpoint("http://proxy.example.com/raw?url=").is_err());
/// assert!(validate_endpoint("file:///etc/passwd").is_err());
/// ```
pub fn validate_endpoint(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "https" => Ok(url),
        "http" if is_loopback_host(&url) => {
            tracing::warn!(endpoint = %url_str, "Using non-HTTPS endpoint (localhost only)");
            Ok(url)
        }
        "http" => Err(UrlValidationError::Insecure),
        scheme => Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
}

fn is_loopback_host(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    if host == "localhost" {
        return true;
    }

    // Strip brackets from IPv6 addresses for parsing
    let host_for_parse = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    host_for_parse
        .parse::<IpAddr>()
        .is_ok_and(|ip| ip.is_loopback())
}

/// Normalizes a feed owner id into the bare handle used in feed paths.
///
/// A single leading `@` is stripped. The remaining handle must be non-empty
/// and free of whitespace and URL delimiters (`/`, `?`, `#`).
///
/// # Examples
///
/// ```
/// use inkfeed::util::validate_owner_id;
///
/// assert_eq!(validate_owner_id("@jane").unwrap(), "jane");
/// assert_eq!(validate_owner_id("jane.doe").unwrap(), "jane.doe");
/// assert!(validate_owner_id("jane/../x").is_err());
/// ```
pub fn validate_owner_id(owner: &str) -> Result<&str, UrlValidationError> {
    let handle = owner.strip_prefix('@').unwrap_or(owner);
    let invalid = handle.is_empty()
        || handle
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '@'));
    if invalid {
        return Err(UrlValidationError::InvalidOwner(owner.to_owned()));
    }
    Ok(handle)
}
