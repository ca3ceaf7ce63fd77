//! MIME normalization and extension mapping.

/// Preferred extensions for common types where the generic table's first
/// entry is not the conventional one (e.g. `image/jpeg` lists `jpe` first).
const PREFERRED_EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/svg+xml", "svg"),
    ("video/mp4", "mp4"),
    ("video/webm", "webm"),
    ("audio/mpeg", "mp3"),
    ("audio/ogg", "ogg"),
    ("text/plain", "txt"),
    ("text/html", "html"),
    ("application/pdf", "pdf"),
    ("application/zip", "zip"),
];

/// Drops MIME parameters: everything from the first `;` onward.
pub fn normalize_mime(mime: &str) -> String {
    let essence = match mime.find(';') {
        Some(i) => &mime[..i],
        None => mime,
    };
    essence.trim().to_ascii_lowercase()
}

/// True if `ext` (without the dot) maps to some MIME type.
pub fn is_known_extension(ext: &str) -> bool {
    !ext.is_empty() && mime_guess::from_ext(ext).first().is_some()
}

/// Canonical extension (without the dot) for a normalized MIME type.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    if let Some(&(_, ext)) = PREFERRED_EXTENSIONS.iter().find(|&&(m, _)| m == mime) {
        return Some(ext);
    }
    mime_guess::get_mime_extensions_str(mime).and_then(|exts| exts.first().copied())
}

/// MIME type guessed from the extension of a URL's path, if any.
pub fn mime_from_url_path(url: &url::Url) -> Option<String> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let (_, ext) = segment.rsplit_once('.')?;
    mime_guess::from_ext(&ext.to_ascii_lowercase())
        .first()
        .map(|m| m.essence_str().to_string())
}
