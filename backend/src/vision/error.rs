//! Error types for frame decoding and landmark detection.

/// Result type for vision operations
pub type VisionResult<T> = Result<T, VisionError>;

/// Error type for vision operations
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// The payload is not valid base64.
    #[error("Invalid base64 image payload")]
    Base64(#[from] base64::DecodeError),

    /// The bytes could not be decoded as an image.
    #[error("Could not decode image")]
    Image(#[from] image::ImageError),

    /// The decoded image has no pixels.
    #[error("Image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    /// The landmark provider failed.
    #[error("Landmark provider '{provider}' failed: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },
}

impl VisionError {
    /// Create a provider error.
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
        }
    }
}
