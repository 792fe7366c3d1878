//! Extension to MIME type mapping and data URI encoding for delivered files.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Checked in order; the first suffix that matches wins.
const MIME_BY_SUFFIX: &[(&[&str], &str)] = &[
    (&[".apng"], "image/apng"),
    (&[".avif"], "image/avif"),
    (&[".gif"], "image/gif"),
    (&[".jpg", ".jpeg", ".jfif", ".pjpeg", ".pjp"], "image/jpeg"),
    (&[".png"], "image/png"),
    (&[".svg"], "image/svg+xml"),
    (&[".webp"], "image/webp"),
];

const FALLBACK_MIME: &str = "image/jpeg";

/// MIME type for `file_name`, derived from its suffix only.
#[must_use]
pub fn mime_type(file_name: &str) -> &'static str {
    MIME_BY_SUFFIX
        .iter()
        .find(|(suffixes, _)| suffixes.iter().any(|s| file_name.ends_with(s)))
        .map_or(FALLBACK_MIME, |&(_, mime)| mime)
}

/// Encode `bytes` as `data:<mime>;base64,<payload>`.
#[must_use]
pub fn data_uri(file_name: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type(file_name), STANDARD.encode(bytes))
}
