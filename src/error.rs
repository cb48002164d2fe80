// Error types for the ID3v2 codec

use thiserror::Error;

/// Result alias used throughout the codec
pub type Result<T> = std::result::Result<T, Id3Error>;

/// Everything that can go wrong while decoding or encoding a tag
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Id3Error {
    /// Bad magic bytes, unsupported major version or a truncated header.
    /// Nothing can be decoded from the buffer.
    #[error("invalid ID3v2 tag: {0}")]
    InvalidTag(String),

    /// A feature the codec refuses to interpret (unsynchronisation,
    /// compressed or encrypted frames, ID3v1)
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(&'static str),

    /// A frame whose body could not be decoded
    #[error("malformed {frame_id} frame: {reason}")]
    MalformedFrame {
        frame_id: String,
        reason: &'static str,
    },

    /// Value does not fit into a 28-bit synchsafe integer (or a 32-bit frame size)
    #[error("{0} is too large to be encoded into synchsafe")]
    ValueTooLarge(u64),

    #[error("invalid frame id {0:?}, expected 4 characters from A-Z and 0-9")]
    InvalidFrameId(String),

    /// Character cannot be represented in a Latin-1 field
    #[error("character {0:?} cannot be encoded as Latin-1")]
    InvalidCharacter(char),

    /// Picture MIME type other than JPEG or PNG
    #[error("unsupported image format: {0}")]
    UnsupportedImageFormat(String),

    /// An edit could not be applied to a metadata field
    #[error("invalid value {value:?} for field {field}")]
    InvalidFieldValue { field: &'static str, value: String },
}

impl Id3Error {
    pub(crate) fn malformed(frame_id: &str, reason: &'static str) -> Self {
        Id3Error::MalformedFrame {
            frame_id: frame_id.to_string(),
            reason,
        }
    }
}
