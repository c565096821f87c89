use std::fmt;

/// Everything that can go wrong while loading parts or exporting a doll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DollError {
    /// Local file could not be read or written.
    Io(String),
    /// Remote resource could not be fetched.
    Http(String),
    /// Manifest is missing, not JSON, or has the wrong shape.
    Manifest(String),
    /// Image bytes could not be decoded.
    Decode(String),
    /// Frame could not be encoded as PNG.
    Encode(String),
    /// No usable font for the export caption.
    Font(String),
}

impl fmt::Display for DollError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DollError::Io(e) => write!(f, "I/O error: {}", e),
            DollError::Http(e) => write!(f, "HTTP error: {}", e),
            DollError::Manifest(e) => write!(f, "Manifest error: {}", e),
            DollError::Decode(e) => write!(f, "Image decode error: {}", e),
            DollError::Encode(e) => write!(f, "PNG encode error: {}", e),
            DollError::Font(e) => write!(f, "Font error: {}", e),
        }
    }
}

impl std::error::Error for DollError {}

impl From<std::io::Error> for DollError {
    fn from(e: std::io::Error) -> Self {
        DollError::Io(e.to_string())
    }
}

impl From<reqwest::Error> for DollError {
    fn from(e: reqwest::Error) -> Self {
        DollError::Http(e.to_string())
    }
}

impl From<serde_json::Error> for DollError {
    fn from(e: serde_json::Error) -> Self {
        DollError::Manifest(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DollError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_the_category() {
        let err = DollError::Manifest("missing \"Prop-path\"".to_string());
        assert_eq!(err.to_string(), "Manifest error: missing \"Prop-path\"");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: DollError = io.into();
        assert!(matches!(err, DollError::Io(ref m) if m.contains("gone")));
    }
}
