//! Shared plumbing for the OpenAI-compatible HTTP providers.

use std::time::Duration;

use crate::error::{Error, Result};

/// Build a blocking client with a per-request timeout.
pub(crate) fn blocking_client(timeout_secs: u64) -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))
}

fn normalize_base_url(url: &str) -> &str {
    url.trim_end_matches('/')
}

fn has_version_suffix(base_url: &str) -> bool {
    let Some(last_segment) = base_url.rsplit('/').next() else {
        return false;
    };
    let Some(rest) = last_segment.strip_prefix('v') else {
        return false;
    };
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

/// Resolve `{base}/{resource}`, inserting `/v1` for bare hosts.
///
/// A base that already ends with the resource is used as-is.
pub(crate) fn endpoint(base_url: &str, resource: &str) -> String {
    let normalized = normalize_base_url(base_url);
    if normalized.ends_with(&format!("/{resource}")) {
        return normalized.to_string();
    }
    if has_version_suffix(normalized) {
        return format!("{normalized}/{resource}");
    }
    format!("{normalized}/v1/{resource}")
}

/// Require a non-blank credential, naming the component that needs it.
pub(crate) fn require_api_key(key: Option<&str>, component: &str) -> Result<String> {
    key.map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            Error::Configuration(format!(
                "OpenAI API key not found for the {component}. \
                 Set OPENAI_API_KEY in your environment or .env file, \
                 or credentials.openai_api_key in config.toml"
            ))
        })
}
