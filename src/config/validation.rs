//! Configuration validation logic.

use regex::Regex;
use url::Url;

use crate::config::loader::Config;
use crate::error::{Error, Result};
use crate::selection::CategoryKind;

/// Validate the entire configuration. The token is checked separately
/// because it may still be missing at this point.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_base_url(&config.account.base_url)?;
    parse_default_categories(&config.options.default_categories)?;

    if config.options.page_size == 0 {
        return Err(Error::ConfigValidation {
            field: "page_size".to_string(),
            message: "Page size must be at least 1".to_string(),
        });
    }

    if config.options.concurrent_transfers == 0 {
        return Err(Error::ConfigValidation {
            field: "concurrent_transfers".to_string(),
            message: "At least one transfer must be allowed to run".to_string(),
        });
    }

    Ok(())
}

fn pattern(regex: &str) -> Result<Regex> {
    Regex::new(regex).map_err(|e| Error::Config(format!("Invalid pattern {}: {}", regex, e)))
}

/// Validate a Canvas access token.
///
/// Tokens look like `<digits>~<characters>`.
pub fn validate_token(token: &str) -> Result<()> {
    let token = token.trim();

    if token.is_empty() {
        return Err(Error::MissingConfig("token".to_string()));
    }

    // Check for placeholder values
    let token_lower = token.to_lowercase();
    if token_lower.contains("replaceme") || token_lower.contains("your_token") {
        return Err(Error::ConfigValidation {
            field: "token".to_string(),
            message: "Token appears to be a placeholder. Please provide your Canvas access token."
                .to_string(),
        });
    }

    if !pattern(r"^\d+~\S+$")?.is_match(token) {
        return Err(Error::ConfigValidation {
            field: "token".to_string(),
            message: "Token should be the long string starting with an integer and '~', not the token name."
                .to_string(),
        });
    }

    Ok(())
}

/// Validate the Canvas base URL.
pub fn validate_base_url(base_url: &str) -> Result<()> {
    let url = Url::parse(base_url)?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::ConfigValidation {
            field: "base_url".to_string(),
            message: format!("Unsupported scheme '{}', use http or https", url.scheme()),
        });
    }

    if url.host_str().is_none() {
        return Err(Error::ConfigValidation {
            field: "base_url".to_string(),
            message: format!("'{}' has no host", base_url),
        });
    }

    Ok(())
}

/// Extract a course id from a bare id or any URL containing `/courses/<id>`.
pub fn parse_course_id(input: &str) -> Result<u64> {
    let input = input.trim();

    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        return input.parse().map_err(|_| Error::ConfigValidation {
            field: "course".to_string(),
            message: format!("Course id '{}' is out of range", input),
        });
    }

    pattern(r"/courses/(\d+)")?
        .captures(input)
        .and_then(|captures| captures.get(1))
        .and_then(|id| id.as_str().parse().ok())
        .ok_or_else(|| Error::ConfigValidation {
            field: "course".to_string(),
            message: format!(
                "Could not find a course in '{}'. Open a Canvas course page and copy its URL.",
                input
            ),
        })
}

/// Parse category names, preserving order and dropping duplicates.
pub fn parse_default_categories<S: AsRef<str>>(names: &[S]) -> Result<Vec<CategoryKind>> {
    let mut kinds = Vec::with_capacity(names.len());

    for name in names {
        let name = name.as_ref();
        let kind: CategoryKind = name
            .parse()
            .map_err(|_| Error::UnknownCategory(name.trim().to_string()))?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }

    Ok(kinds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_token() {
        assert!(validate_token("21450~Xk2pQv9aBcDeFgHiJkLmNoPqRsTuVwXyZ").is_ok());
        assert!(validate_token("  7~abc  ").is_ok());
    }

    #[test]
    fn test_invalid_tokens() {
        assert!(matches!(validate_token(""), Err(Error::MissingConfig(_))));
        assert!(validate_token("REPLACEME").is_err());
        assert!(validate_token("my laptop token").is_err());
        assert!(validate_token("abc~def").is_err());
        assert!(validate_token("1234~has space").is_err());
    }

    #[test]
    fn test_base_url() {
        assert!(validate_base_url("https://canvas.nus.edu.sg").is_ok());
        assert!(validate_base_url("http://localhost:8080").is_ok());
        assert!(validate_base_url("ftp://canvas.example").is_err());
        assert!(validate_base_url("canvas.example").is_err());
    }

    #[test]
    fn test_parse_course_id() {
        assert_eq!(parse_course_id("12345").unwrap(), 12345);
        assert_eq!(
            parse_course_id("https://canvas.nus.edu.sg/courses/67890/modules").unwrap(),
            67890
        );
        assert_eq!(parse_course_id("/courses/42").unwrap(), 42);
        assert!(parse_course_id("https://canvas.nus.edu.sg/dashboard").is_err());
        assert!(parse_course_id("").is_err());
    }

    #[test]
    fn test_parse_default_categories() {
        let kinds = parse_default_categories(&["files", "Modules", "files"]).unwrap();
        assert_eq!(kinds, vec![CategoryKind::Files, CategoryKind::Modules]);

        assert!(matches!(
            parse_default_categories(&["videos"]),
            Err(Error::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_validate_config_defaults() {
        assert!(validate_config(&Config::default()).is_ok());

        let mut config = Config::default();
        config.options.page_size = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.options.concurrent_transfers = 0;
        assert!(matches!(
            validate_config(&config),
            Err(Error::ConfigValidation { field, .. }) if field == "concurrent_transfers"
        ));
    }
}
