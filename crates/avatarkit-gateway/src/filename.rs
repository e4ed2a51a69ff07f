const MAX_FILENAME_LENGTH: usize = 255;

/// File name safe to forward to the provider: directory components dropped,
/// anything outside `[A-Za-z0-9._-]` replaced with `_`.
pub fn sanitize_filename(filename: &str) -> String {
    let filename_only = std::path::Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches('.').is_empty() || sanitized.len() < 3 {
        return "file".to_string();
    }

    sanitized
}
