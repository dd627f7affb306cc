use std::{fmt, path::PathBuf};

/// The main error type for the bitpunker crate
#[derive(Debug)]
pub enum DitherError {
    /// Invalid option values or a missing resource the user has to create
    /// (bad depth or sigma, missing blue noise map, malformed config file).
    Configuration(String),

    /// Error occurred while reading or decoding an input image
    Resource {
        path: PathBuf,
        source: image::ImageError,
    },

    /// Error occurred while writing or encoding an image
    ImageEncode(image::ImageError),

    /// Error occurred during I/O operations (file read/write)
    Io(std::io::Error),

    /// Operation called on a ditherer that has no usable image bound
    InvalidState(String),
}

impl DitherError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        DitherError::Configuration(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        DitherError::InvalidState(msg.into())
    }

    pub fn resource(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        DitherError::Resource {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for DitherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DitherError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            DitherError::Resource { path, source } => {
                write!(f, "Cannot read image {}: {}", path.display(), source)
            }
            DitherError::ImageEncode(e) => write!(f, "Image encode error: {}", e),
            DitherError::Io(e) => write!(f, "I/O error: {}", e),
            DitherError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
        }
    }
}

impl std::error::Error for DitherError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DitherError::Resource { source, .. } => Some(source),
            DitherError::ImageEncode(e) => Some(e),
            DitherError::Io(e) => Some(e),
            DitherError::Configuration(_) | DitherError::InvalidState(_) => None,
        }
    }
}

// From implementations for automatic conversion from common error types

impl From<std::io::Error> for DitherError {
    fn from(err: std::io::Error) -> Self {
        DitherError::Io(err)
    }
}

impl From<json::Error> for DitherError {
    fn from(err: json::Error) -> Self {
        DitherError::Configuration(format!("config is not valid JSON: {}", err))
    }
}

// Convenience type alias for Results using DitherError
pub type Result<T = ()> = std::result::Result<T, DitherError>;

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn test_configuration_message() {
        let err = DitherError::configuration("depth is too high");
        assert_eq!(err.to_string(), "Configuration error: depth is too high");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err: DitherError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, DitherError::Io(_)));
        assert!(err.source().is_some());
    }
}
