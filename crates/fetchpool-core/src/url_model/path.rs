//! Last path segment of a URL or storage key.

/// Returns the last non-empty path segment of `id`.
///
/// Absolute URLs are parsed so query strings and fragments are dropped;
/// anything else is treated as a `/`-separated storage key.
pub fn last_segment(id: &str) -> Option<String> {
    let segment = match url::Url::parse(id) {
        Ok(parsed) => parsed
            .path_segments()?
            .filter(|s| !s.is_empty())
            .last()?
            .to_string(),
        Err(_) => id.split('/').filter(|s| !s.is_empty()).last()?.to_string(),
    };
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment)
}
