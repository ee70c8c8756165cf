//! Linux-safe file name components.

/// Longest component we emit, leaving room for the store's prefix and
/// random suffix within NAME_MAX (255).
const MAX_COMPONENT: usize = 200;

/// Sanitizes one file name component.
///
/// Separators, NUL, control characters and whitespace become `_` (runs
/// collapse to one), leading/trailing dots and underscores are trimmed, and
/// the result is cut to a char boundary at `MAX_COMPONENT` bytes.
pub fn sanitize_component(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let unsafe_char = c == '/' || c == '\\' || c.is_control() || c.is_whitespace();
        let c = if unsafe_char { '_' } else { c };
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let mut take = trimmed.len().min(MAX_COMPONENT);
    while take > 0 && !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}
