//! Filename derivation: sanitization plus extension correction.
//!
//! Pure; no filesystem access. Collision handling lives in `conflict`.

mod mime;
mod sanitize;

pub use mime::{extension_for_mime, is_known_extension, mime_from_url_path, normalize_mime};
pub use sanitize::{sanitize, SanitizeMode, FILENAME_LENGTH_LIMIT};

/// Derives a normalized, extension-correct filename from a raw candidate
/// name and a MIME hint.
///
/// The canonical extension for the (parameter-stripped) MIME type is
/// appended only when the current tail is not a recognized extension; an
/// already-present but unknown extension is kept and extended, never
/// replaced.
pub fn derive(raw: &str, mime: &str, mode: SanitizeMode) -> String {
    let normalized_mime = normalize_mime(mime);
    let mut result = sanitize(raw, mode);

    let ext = result.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
    if !is_known_extension(&ext.to_ascii_lowercase()) {
        if let Some(mapped) = extension_for_mime(&normalized_mime) {
            tracing::debug!("appending extension {mapped} to {result}");
            result.push('.');
            result.push_str(mapped);
        }
    }
    result
}
