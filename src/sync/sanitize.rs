//! Filesystem-safe path segments from display names.

/// Default maximum segment length.
pub const DEFAULT_MAX_LENGTH: usize = 50;

/// Sanitize a display name with the default length limit.
#[must_use]
pub fn sanitize(name: &str) -> String {
    sanitize_with_limit(name, DEFAULT_MAX_LENGTH)
}

/// Sanitize a display name into a path segment of at most `max_length` chars.
///
/// Keeps ASCII letters, digits, `-` and `_`; spaces become `_`; everything
/// else is dropped. Runs of `_` collapse to one and the result never starts
/// or ends with `_`. An empty result is possible and left to the caller.
#[must_use]
pub fn sanitize_with_limit(name: &str, max_length: usize) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = match c {
            ' ' => '_',
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' => c,
            _ => continue,
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }

    let trimmed: String = out.trim_matches('_').chars().take(max_length).collect();
    // Truncation can expose a trailing separator.
    trimmed.trim_end_matches('_').to_string()
}
