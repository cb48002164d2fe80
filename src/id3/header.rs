// ID3v2 tag header
//
// "ID3" | major | revision | flags | synchsafe size (4 bytes)

use crate::error::{Id3Error, Result};
use crate::utils::synchsafe::{decode_synchsafe, encode_synchsafe, read_be_u32};

/// Size of the tag header, the optional footer and every frame header
pub const HEADER_SIZE: usize = 10;

const MAGIC: [u8; 3] = *b"ID3";
const FLAG_UNSYNCHRONISATION: u8 = 0x80;
const FLAG_EXTENDED_HEADER: u8 = 0x40;
const FLAG_FOOTER: u8 = 0x10;

/// Parsed tag header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHeader {
    pub major: u8,
    pub revision: u8,
    pub flags: u8,
    /// Size of everything after the header, footer excluded
    pub size: u32,
}

impl TagHeader {
    /// Header the writer emits: ID3v2.3.0, no flags
    pub fn v3(size: u32) -> Self {
        TagHeader {
            major: 3,
            revision: 0,
            flags: 0,
            size,
        }
    }

    /// Parse and validate the first 10 bytes of a tag
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(Id3Error::InvalidTag(format!(
                "{} bytes is too short for a tag header",
                bytes.len()
            )));
        }
        if bytes[..3] != MAGIC {
            return Err(Id3Error::InvalidTag("missing \"ID3\" identifier".to_string()));
        }

        let major = bytes[3];
        if !(3..=4).contains(&major) {
            return Err(Id3Error::InvalidTag(format!(
                "ID3v2.{} is not supported, only ID3v2.3 and ID3v2.4",
                major
            )));
        }

        Ok(TagHeader {
            major,
            revision: bytes[4],
            flags: bytes[5],
            size: decode_synchsafe(bytes, 6),
        })
    }

    /// Serialize the header; fails if the size exceeds the synchsafe range
    pub fn to_bytes(&self) -> Result<[u8; HEADER_SIZE]> {
        let mut header = [0u8; HEADER_SIZE];
        header[..3].copy_from_slice(&MAGIC);
        header[3] = self.major;
        header[4] = self.revision;
        header[5] = self.flags;
        header[6..].copy_from_slice(&encode_synchsafe(self.size)?);
        Ok(header)
    }

    pub fn unsynchronised(&self) -> bool {
        self.flags & FLAG_UNSYNCHRONISATION != 0
    }

    pub fn has_extended_header(&self) -> bool {
        self.flags & FLAG_EXTENDED_HEADER != 0
    }

    /// Only ID3v2.4 defines a footer
    pub fn has_footer(&self) -> bool {
        self.major == 4 && self.flags & FLAG_FOOTER != 0
    }

    /// End offset of the whole tag, where the audio begins
    pub fn tag_end(&self) -> usize {
        let footer = if self.has_footer() { HEADER_SIZE } else { 0 };
        HEADER_SIZE + self.size as usize + footer
    }

    /// Offset of the first frame, past the extended header when present.
    ///
    /// The extended header is skipped, never interpreted.
    pub fn frames_start(&self, bytes: &[u8]) -> Result<usize> {
        if !self.has_extended_header() {
            return Ok(HEADER_SIZE);
        }
        if bytes.len() < HEADER_SIZE + 4 {
            return Err(Id3Error::InvalidTag("truncated extended header".to_string()));
        }

        log::warn!("skipping extended header, its contents are not supported");
        let skip = if self.major == 4 {
            // v2.4 counts the size field itself
            decode_synchsafe(bytes, HEADER_SIZE) as usize
        } else {
            4usize.saturating_add(read_be_u32(bytes, HEADER_SIZE) as usize)
        };
        let start = HEADER_SIZE.saturating_add(skip);
        if start > self.tag_end() {
            return Err(Id3Error::InvalidTag("extended header overruns the tag".to_string()));
        }
        Ok(start)
    }

    pub fn version(&self) -> String {
        format!("2.{}.{}", self.major, self.revision)
    }
}

/// Validate the header of `bytes` and compute where the tag ends.
///
/// A tag claiming more bytes than the buffer holds is rejected.
pub fn split_tag(bytes: &[u8]) -> Result<(TagHeader, usize)> {
    let header = TagHeader::parse(bytes)?;
    let tag_end = header.tag_end();
    if tag_end > bytes.len() {
        return Err(Id3Error::InvalidTag(format!(
            "tag claims {} bytes but only {} are available",
            tag_end,
            bytes.len()
        )));
    }
    Ok((header, tag_end))
}
