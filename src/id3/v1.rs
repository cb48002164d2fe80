// ID3v1 trailer detection
//
// ID3v1 tags are not decoded. They are only recognized so that a file
// carrying nothing but an ID3v1 trailer gets a clear error.

use crate::error::{Id3Error, Result};

const TAG_SIZE: usize = 128;
const TAG_ID: [u8; 3] = *b"TAG";

/// Whether the last 128 bytes of `bytes` form an ID3v1 tag
pub fn has_id3v1_trailer(bytes: &[u8]) -> bool {
    bytes.len() >= TAG_SIZE && bytes[bytes.len() - TAG_SIZE..].starts_with(&TAG_ID)
}

/// Fail when the buffer only carries ID3v1 metadata
pub fn reject_id3v1_only(bytes: &[u8]) -> Result<()> {
    if !bytes.starts_with(b"ID3") && has_id3v1_trailer(bytes) {
        return Err(Id3Error::UnsupportedFeature("ID3v1 tags"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_trailer(audio: &[u8]) -> Vec<u8> {
        let mut bytes = audio.to_vec();
        let mut trailer = [0u8; TAG_SIZE];
        trailer[..3].copy_from_slice(b"TAG");
        trailer[3..8].copy_from_slice(b"Title");
        bytes.extend_from_slice(&trailer);
        bytes
    }

    #[test]
    fn test_detects_trailer() {
        assert!(has_id3v1_trailer(&with_trailer(b"audio")));
        assert!(!has_id3v1_trailer(b"TAG"));
        assert!(!has_id3v1_trailer(&[0u8; 200]));
    }

    #[test]
    fn test_rejects_only_without_id3v2() {
        assert_eq!(
            reject_id3v1_only(&with_trailer(b"audio")),
            Err(Id3Error::UnsupportedFeature("ID3v1 tags"))
        );
        assert_eq!(reject_id3v1_only(&with_trailer(b"ID3\x03")), Ok(()));
        assert_eq!(reject_id3v1_only(b"plain audio"), Ok(()));
    }
}
