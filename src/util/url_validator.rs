use thiserror::Error;
use url::Url;

/// Errors from validating the store's base address.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL has no host component.
    #[error("URL has no host")]
    MissingHost,
    /// Query strings and fragments cannot be combined with resource paths.
    #[error("Base URL must not carry a query or fragment")]
    QueryOrFragment,
}

/// Validate and normalize the store's base address.
///
/// LAN and loopback hosts are accepted. The returned URL always ends in `/` so
/// that resource paths join beneath any prefix (`http://host/api` becomes
/// `http://host/api/`).
///
/// ```
/// use taskmaster::util::validate_base_url;
///
/// let url = validate_base_url("http://192.168.1.178:3000").unwrap();
/// assert_eq!(url.as_str(), "http://192.168.1.178:3000/");
///
/// assert!(validate_base_url("ftp://example.com").is_err());
/// ```
pub fn validate_base_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let mut url = Url::parse(url_str.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if !url.host_str().is_some_and(|h| !h.is_empty()) {
        return Err(UrlValidationError::MissingHost);
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(UrlValidationError::QueryOrFragment);
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lan_address_accepted() {
        let url = validate_base_url("http://192.168.1.178:3000").unwrap();
        assert_eq!(url.port(), Some(3000));
        assert_eq!(url.path(), "/");
    }

    #[test]
    fn test_localhost_accepted() {
        assert!(validate_base_url("http://localhost:3000").is_ok());
        assert!(validate_base_url("http://127.0.0.1:3000/").is_ok());
    }

    #[test]
    fn test_path_prefix_gets_trailing_slash() {
        let url = validate_base_url("https://example.com/api/v1").unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/v1/");
    }

    #[test]
    fn test_existing_trailing_slash_kept() {
        let url = validate_base_url("https://example.com/api/").unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/");
    }

    #[test]
    fn test_invalid_schemes() {
        assert!(matches!(
            validate_base_url("file:///etc/passwd"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
        assert!(validate_base_url("ws://example.com").is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            validate_base_url("not a url"),
            Err(UrlValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_query_rejected() {
        assert!(matches!(
            validate_base_url("http://example.com/?token=1"),
            Err(UrlValidationError::QueryOrFragment)
        ));
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        assert!(validate_base_url("  http://example.com  ").is_ok());
    }
}
