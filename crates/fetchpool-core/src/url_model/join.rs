//! Resolve replica locations against a base host URL.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JoinError {
    #[error("location {0:?} is relative and no host URL is configured")]
    MissingBase(String),
    #[error("invalid URL: {0}")]
    Parse(#[from] url::ParseError),
}

/// Returns `location` as an absolute URL string.
///
/// Absolute locations are used as-is. Relative ones are appended to the path
/// of `base`, which is treated as a directory even without a trailing slash
/// (`http://h/videos` + `a.mov` → `http://h/videos/a.mov`).
pub fn join_location(base: Option<&str>, location: &str) -> Result<String, JoinError> {
    if let Ok(absolute) = url::Url::parse(location) {
        return Ok(absolute.to_string());
    }
    let base = base.ok_or_else(|| JoinError::MissingBase(location.to_string()))?;
    let mut base = url::Url::parse(base)?;
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    Ok(base.join(location.trim_start_matches('/'))?.to_string())
}
