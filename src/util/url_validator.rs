use thiserror::Error;
use url::Url;

/// Errors from checking a story link before handing it to a browser.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The link could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The link uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
}

/// Validate a story link before it is passed to an external opener.
///
/// Feed content is untrusted, and openers dispatch on scheme, so only
/// `http` and `https` links are let through.
///
/// # Examples
///
/// ```
/// use canto::util::validate_url_for_open;
///
/// assert!(validate_url_for_open("https://lwn.net/Articles/1/").is_ok());
/// assert!(validate_url_for_open("file:///etc/passwd").is_err());
/// assert!(validate_url_for_open("not a url").is_err());
/// ```
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert!(validate_url_for_open("https://example.com/story").is_ok());
        assert!(validate_url_for_open("http://news.example.org").is_ok());
    }

    #[test]
    fn test_local_urls_allowed() {
        // A browser opening localhost is the user's business.
        assert!(validate_url_for_open("http://localhost:8080/").is_ok());
    }

    #[test]
    fn test_invalid_schemes() {
        assert!(matches!(
            validate_url_for_open("file:///etc/passwd"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
        assert!(validate_url_for_open("javascript:alert(1)").is_err());
    }

    #[test]
    fn test_unparseable() {
        assert!(matches!(
            validate_url_for_open(""),
            Err(UrlValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        let url = validate_url_for_open("  https://example.com/a  ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a");
    }
}
