//! Destination hints and replica locations.
//!
//! Turns an item identifier into a filesystem-safe name hint for the store,
//! and resolves race replica locations against a base host URL.

mod join;
mod path;
mod sanitize;

pub use join::{join_location, JoinError};
pub use path::last_segment;
pub use sanitize::sanitize_component;

/// Hint used when the identifier yields nothing usable.
pub const DEFAULT_HINT: &str = "payload.bin";

/// Derives a safe file name hint for storing the payload of `item_id`.
///
/// Uses the last path segment of a URL (query and fragment ignored) or of a
/// plain storage key, sanitized for Linux file names.
///
/// - `destination_hint("https://example.com/v/clip.mov?x=1")` → `"clip.mov"`
/// - `destination_hint("bucket/key/0cf5.MOV")` → `"0cf5.MOV"`
pub fn destination_hint(item_id: &str) -> String {
    let Some(raw) = last_segment(item_id) else {
        return DEFAULT_HINT.to_string();
    };
    let sanitized = sanitize_component(&raw);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_HINT.to_string()
    } else {
        sanitized
    }
}

/// Splits a hint into stem and extension (extension keeps its leading dot).
///
/// A leading dot does not start an extension, and neither does a trailing one.
pub fn split_extension(hint: &str) -> (&str, &str) {
    match hint.rfind('.') {
        Some(i) if i > 0 && i + 1 < hint.len() => hint.split_at(i),
        _ => (hint, ""),
    }
}
