//! Error types for roborock-map

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while decoding a binary map payload
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// Payload does not start with the `rr` magic
    #[error("Invalid magic bytes: {0:02x?}")]
    InvalidMagic([u8; 2]),

    /// File or block header declares an impossible size
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// A read ran past the end of the buffer
    #[error("Truncated payload: needed {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        /// Offset where the read started
        offset: usize,
        /// Bytes requested
        needed: usize,
        /// Bytes remaining in the buffer
        available: usize,
    },

    /// A block's content is inconsistent with its declared length
    #[error("Malformed {block} block: {reason}")]
    MalformedBlock {
        /// Block name
        block: &'static str,
        /// What was wrong
        reason: String,
    },

    /// The two calibration reference points do not define a mapping
    #[error("Degenerate calibration: reference points share an axis")]
    DegenerateCalibration,

    /// Compressed payload could not be inflated
    #[error("Compression error: {0}")]
    Compression(String),
}

/// Errors raised while rendering a decoded map
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// PNG encoding failed
    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// Transformed canvas exceeds the pixel budget
    #[error("Output image too large: {width}x{height}")]
    TooLarge { width: u32, height: u32 },
}

/// Errors raised while resolving or loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Override path does not name a known setting
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Override value has the wrong type or is out of range
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue {
        /// Dotted path of the setting
        key: String,
        /// What was wrong
        reason: String,
    },

    /// I/O error while reading a config file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by a map transport
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Device did not answer in time
    #[error("Request timed out")]
    Timeout,

    /// Device identifier is not known to the transport
    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

/// Crate-wide error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Payload decoding failed
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Rendering failed
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Configuration failed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Transport failed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Attribute serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
