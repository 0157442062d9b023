use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};
use validator::ValidationError;

lazy_static! {
    /// Regex for validating slugs
    /// Must be lowercase alphanumeric with single hyphens between groups
    /// - Valid: "annual-report", "etf2024", "tag-1a2b3c4d"
    /// - Invalid: "-tag", "tag-", "tag--name", "Tag", "tag_name"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// Runs of separators that collapse into a single hyphen
    static ref SEPARATOR_REGEX: Regex = Regex::new(r"[\s_\-]+").unwrap();

    /// Everything that is neither ASCII alphanumeric nor a hyphen
    static ref DISALLOWED_REGEX: Regex = Regex::new(r"[^a-z0-9\-]").unwrap();

    /// Repeated hyphens left behind after dropping characters
    static ref HYPHEN_RUN_REGEX: Regex = Regex::new(r"-{2,}").unwrap();
}

/// Derive a URL-safe slug from a display name.
///
/// Names without any ASCII alphanumerics (e.g. Chinese tag names) fall back
/// to `tag-` plus the first 8 hex characters of the name's SHA-256 digest.
pub fn slugify(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let hyphenated = SEPARATOR_REGEX.replace_all(&lowered, "-");
    let stripped = DISALLOWED_REGEX.replace_all(&hyphenated, "");
    let collapsed = HYPHEN_RUN_REGEX.replace_all(&stripped, "-");
    let slug = collapsed.trim_matches('-').to_string();

    if slug.is_empty() {
        let digest = Sha256::digest(name.trim().as_bytes());
        format!("tag-{}", &hex::encode(digest)[..8])
    } else {
        slug
    }
}

/// Absolute http(s) URL with a host
pub fn is_http_url(value: &str) -> bool {
    reqwest::Url::parse(value.trim())
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}

/// Validator hook for link fields: empty clears the link, anything else must be http(s)
pub fn validate_link(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || is_http_url(value) {
        return Ok(());
    }
    let mut err = ValidationError::new("http_url");
    err.message = Some("Must be an http(s) URL".into());
    Err(err)
}
