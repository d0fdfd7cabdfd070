//! MIME type handling

use std::path::Path;

/// Get MIME type for a file path
pub fn guess_mime_type(path: &Path) -> &'static str {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_types() {
        assert_eq!(guess_mime_type(Path::new("index.html")), "text/html");
        assert_eq!(guess_mime_type(Path::new("style.css")), "text/css");
        assert_eq!(guess_mime_type(Path::new("app.js")), "text/javascript");
        assert_eq!(guess_mime_type(Path::new("canvaskit.wasm")), "application/wasm");
        assert_eq!(guess_mime_type(Path::new("NOTICES")), "application/octet-stream");
    }
}
