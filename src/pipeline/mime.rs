//! Extension → MIME type.
//!
//! The upload API needs an explicit content type. The scan already restricts
//! inputs to the four known extensions, so the `image/jpeg` fallback is only
//! reached by direct callers passing something else.

/// MIME type used for any extension not in the table.
pub const DEFAULT_MIME: &str = "image/jpeg";

const MIME_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
];

fn normalise(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}

/// Resolve the MIME type for a file extension (case-insensitive, leading dot optional).
pub fn mime_for_extension(ext: &str) -> &'static str {
    let ext = normalise(ext);
    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME)
}

/// Whether the scan should pick up files with this extension.
pub fn is_supported_extension(ext: &str) -> bool {
    let ext = normalise(ext);
    MIME_TYPES.iter().any(|(known, _)| *known == ext)
}
