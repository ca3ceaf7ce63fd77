//! Candidate filename normalization.

/// Maximum filename length after sanitization.
pub const FILENAME_LENGTH_LIMIT: usize = 100;

/// Character-strip mode for candidate filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeMode {
    /// Keep only `[A-Za-z0-9._-]`.
    Strict,
    /// Strip only control characters.
    Lenient,
}

/// Normalizes a raw candidate name: last path segment, text before the
/// first space, disallowed characters stripped, truncated to the length
/// limit (prefix kept).
pub fn sanitize(raw: &str, mode: SanitizeMode) -> String {
    let after_slash = match raw.rfind('/') {
        Some(i) => &raw[i + 1..],
        None => raw,
    };
    // Names embedding free-form trailing text lose everything after the
    // first space.
    let before_space = match after_slash.find(' ') {
        Some(i) => &after_slash[..i],
        None => after_slash,
    };

    let mut out: String = before_space
        .chars()
        .filter(|&c| match mode {
            SanitizeMode::Strict => c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-',
            SanitizeMode::Lenient => !c.is_control(),
        })
        .collect();

    if out.chars().count() > FILENAME_LENGTH_LIMIT {
        out = out.chars().take(FILENAME_LENGTH_LIMIT).collect();
    }
    out
}
