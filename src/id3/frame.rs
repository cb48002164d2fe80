// ID3v2 frame header
//
// Frame ID       $xx xx xx xx (four characters)
// Size           $xx xx xx xx (body length, header excluded)
// Flags          $xx xx

use crate::error::{Id3Error, Result};
use crate::id3::header::HEADER_SIZE;
use crate::utils::encoding::decode_latin1;
use crate::utils::synchsafe::{decode_synchsafe, length_to_u32, read_be_u16, read_be_u32};

/// Frame header fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub id: String,
    /// Body length in bytes, not counting this header
    pub size: u32,
    pub flags: u16,
}

impl FrameHeader {
    /// Parse a frame header. ID3v2.4 stores the size synchsafe, ID3v2.3 as a
    /// plain big-endian integer.
    pub fn parse(bytes: &[u8], major: u8) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(Id3Error::malformed("(unknown)", "truncated frame header"));
        }

        let size = if major >= 4 {
            decode_synchsafe(bytes, 4)
        } else {
            read_be_u32(bytes, 4)
        };

        Ok(FrameHeader {
            id: decode_latin1(&bytes[..4]),
            size,
            flags: read_be_u16(bytes, 8),
        })
    }

    /// Offset just past the body, relative to the start of the header
    pub fn total_len(&self) -> usize {
        HEADER_SIZE.saturating_add(self.size as usize)
    }

    /// Frames whose body is transformed (compressed, encrypted, grouped,
    /// unsynchronised) cannot be decoded
    pub fn unsupported_flag(&self, major: u8) -> Option<&'static str> {
        let format_flags = self.flags & 0x00FF;
        if major >= 4 {
            match format_flags {
                f if f & 0x0008 != 0 => Some("compressed frame"),
                f if f & 0x0004 != 0 => Some("encrypted frame"),
                f if f & 0x0040 != 0 => Some("grouped frame"),
                f if f & 0x0003 != 0 => Some("unsynchronised frame"),
                _ => None,
            }
        } else {
            match format_flags {
                f if f & 0x0080 != 0 => Some("compressed frame"),
                f if f & 0x0040 != 0 => Some("encrypted frame"),
                f if f & 0x0020 != 0 => Some("grouped frame"),
                _ => None,
            }
        }
    }
}

/// Whether `id` is a well-formed frame id (4 characters, A-Z and 0-9)
pub fn is_valid_frame_id(id: &str) -> bool {
    id.len() == 4
        && id
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// Build a frame header for a body of `content_length` bytes
pub fn build_frame_header(id: &str, content_length: usize, flags: u16) -> Result<[u8; HEADER_SIZE]> {
    if !is_valid_frame_id(id) {
        return Err(Id3Error::InvalidFrameId(id.to_string()));
    }

    let mut header = [0u8; HEADER_SIZE];
    header[..4].copy_from_slice(id.as_bytes());
    header[4..8].copy_from_slice(&length_to_u32(content_length)?.to_be_bytes());
    header[8..].copy_from_slice(&flags.to_be_bytes());
    Ok(header)
}
