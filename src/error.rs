//! Error handling

use std::path::PathBuf;

/// Errors raised by the brandgen pipeline.
#[derive(Debug)]
pub enum BrandgenError {
    /// Reading or writing a file failed
    Io {
        /// The file or directory involved
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
    /// The config file isn't valid JSON of the expected shape
    ConfigParse {
        /// Where the config came from
        path: PathBuf,
        /// Underlying parse error
        source: serde_json::Error,
    },
    /// The config parsed but contains values we can't use
    InvalidConfig(String),
    /// The batch input file couldn't be parsed
    BatchParse {
        /// Where the batch came from
        path: PathBuf,
        /// Underlying parse error
        source: serde_json::Error,
    },
    /// The configured image provider needs an API key and none was found
    MissingApiKey,
    /// Encoding or decoding an image failed
    Image(image::ImageError),
    /// An HTTP request failed before we got a response
    Http(reqwest::Error),
    /// The image provider returned something we can't use
    Producer(String),
}

impl std::fmt::Display for BrandgenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::ConfigParse { path, source } => {
                write!(f, "Failed to parse config {}: {source}", path.display())
            }
            Self::InvalidConfig(message) => write!(f, "Invalid config: {message}"),
            Self::BatchParse { path, source } => {
                write!(f, "Failed to parse batch file {}: {source}", path.display())
            }
            Self::MissingApiKey => write!(
                f,
                "GEMINI_API_KEY not found in environment, secrets file or config"
            ),
            Self::Image(err) => write!(f, "Image error: {err}"),
            Self::Http(err) => write!(f, "HTTP error: {err}"),
            Self::Producer(message) => write!(f, "Image production failed: {message}"),
        }
    }
}

impl std::error::Error for BrandgenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::ConfigParse { source, .. } | Self::BatchParse { source, .. } => Some(source),
            Self::Image(err) => Some(err),
            Self::Http(err) => Some(err),
            Self::InvalidConfig(_) | Self::MissingApiKey | Self::Producer(_) => None,
        }
    }
}

impl From<image::ImageError> for BrandgenError {
    fn from(err: image::ImageError) -> Self {
        BrandgenError::Image(err)
    }
}

impl From<reqwest::Error> for BrandgenError {
    fn from(err: reqwest::Error) -> Self {
        BrandgenError::Http(err)
    }
}

impl BrandgenError {
    /// Wraps an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BrandgenError::Io {
            path: path.into(),
            source,
        }
    }
}
