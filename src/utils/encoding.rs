// Text encodings used by ID3v2 frames

use encoding_rs::{UTF_16BE, UTF_16LE, UTF_8};

use crate::error::{Id3Error, Result};

/// UTF-16 little-endian byte-order mark written before every UTF-16 string
pub const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
/// UTF-16 big-endian byte-order mark
pub const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// Text encoding types, discriminants are the on-disk encoding byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Iso8859_1 = 0,
    /// UTF-16 with a byte-order mark in front of every string
    Utf16 = 1,
    Utf16BE = 2,
    Utf8 = 3,
}

impl TextEncoding {
    /// Map the encoding byte of a frame, `None` for unknown bytes
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(TextEncoding::Iso8859_1),
            1 => Some(TextEncoding::Utf16),
            2 => Some(TextEncoding::Utf16BE),
            3 => Some(TextEncoding::Utf8),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Width of a NUL terminator in this encoding
    pub fn terminator_len(self) -> usize {
        match self {
            TextEncoding::Iso8859_1 | TextEncoding::Utf8 => 1,
            TextEncoding::Utf16 | TextEncoding::Utf16BE => 2,
        }
    }
}

/// Decode text with specified encoding, dropping trailing NULs.
///
/// For [`TextEncoding::Utf16`] the byte-order mark is consumed; a missing
/// BOM is read as little-endian.
pub fn decode_text(data: &[u8], encoding: TextEncoding) -> String {
    let text = match encoding {
        TextEncoding::Iso8859_1 => decode_latin1(data),
        TextEncoding::Utf16 => {
            if data.starts_with(&UTF16_LE_BOM) {
                UTF_16LE.decode_without_bom_handling(even_units(&data[2..])).0.into_owned()
            } else if data.starts_with(&UTF16_BE_BOM) {
                UTF_16BE.decode_without_bom_handling(even_units(&data[2..])).0.into_owned()
            } else {
                UTF_16LE.decode_without_bom_handling(even_units(data)).0.into_owned()
            }
        }
        TextEncoding::Utf16BE => UTF_16BE.decode_without_bom_handling(even_units(data)).0.into_owned(),
        TextEncoding::Utf8 => UTF_8.decode_without_bom_handling(data).0.into_owned(),
    };

    strip_trailing_nulls(text)
}

/// Drop a lone trailing NUL byte left by single-byte terminators in UTF-16 text
fn even_units(data: &[u8]) -> &[u8] {
    match data.split_last() {
        Some((&0, rest)) if data.len() % 2 == 1 => rest,
        _ => data,
    }
}

/// Encode text with specified encoding, without a terminator.
///
/// [`TextEncoding::Utf16`] always produces a little-endian BOM followed by
/// UTF-16LE code units. Latin-1 refuses characters above U+00FF.
pub fn encode_text(text: &str, encoding: TextEncoding) -> Result<Vec<u8>> {
    match encoding {
        TextEncoding::Iso8859_1 => encode_latin1(text),
        TextEncoding::Utf16 => {
            let mut bytes = Vec::with_capacity(2 + text.len() * 2);
            bytes.extend_from_slice(&UTF16_LE_BOM);
            bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
            Ok(bytes)
        }
        TextEncoding::Utf16BE => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
        TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
    }
}

/// Encode an identifier-like field (MIME type, language code) as Latin-1
pub fn encode_latin1(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).map_err(|_| Id3Error::InvalidCharacter(c)))
        .collect()
}

/// Latin-1 maps every byte straight onto the first 256 code points
pub fn decode_latin1(data: &[u8]) -> String {
    data.iter().map(|&b| char::from(b)).collect()
}

/// Find the NUL terminator of a string starting at `start`.
///
/// Double-byte encodings look for an aligned `00 00` pair (aligned relative
/// to `start`). Returns the index of the first terminator byte, or `None`
/// when the buffer ends first.
pub fn find_terminator(data: &[u8], start: usize, encoding: TextEncoding) -> Option<usize> {
    if start > data.len() {
        return None;
    }

    match encoding.terminator_len() {
        1 => data[start..].iter().position(|&b| b == 0).map(|i| start + i),
        _ => data[start..]
            .chunks_exact(2)
            .position(|pair| pair == [0, 0])
            .map(|i| start + i * 2),
    }
}

fn strip_trailing_nulls(mut text: String) -> String {
    let trimmed = text.trim_end_matches('\0').len();
    text.truncate(trimmed);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TextEncoding; 4] = [
        TextEncoding::Iso8859_1,
        TextEncoding::Utf16,
        TextEncoding::Utf16BE,
        TextEncoding::Utf8,
    ];

    #[test]
    fn test_encoding_bytes() {
        for encoding in ALL {
            assert_eq!(TextEncoding::from_byte(encoding.as_byte()), Some(encoding));
        }
        assert_eq!(TextEncoding::from_byte(4), None);
    }

    #[test]
    fn test_round_trip_every_encoding() {
        for text in ["", "Test Song", "Café Del Mar", "ÿ at the edge"] {
            for encoding in ALL {
                let encoded = encode_text(text, encoding).unwrap();
                assert_eq!(decode_text(&encoded, encoding), text, "{:?}", encoding);
            }
        }
        for encoding in [TextEncoding::Utf16, TextEncoding::Utf16BE, TextEncoding::Utf8] {
            let encoded = encode_text("東京 🎵", encoding).unwrap();
            assert_eq!(decode_text(&encoded, encoding), "東京 🎵");
        }
    }

    #[test]
    fn test_utf16_bom_handling() {
        let le = encode_text("Hi", TextEncoding::Utf16).unwrap();
        assert_eq!(le, vec![0xFF, 0xFE, b'H', 0, b'i', 0]);

        let be = [0xFE, 0xFF, 0, b'H', 0, b'i'];
        assert_eq!(decode_text(&be, TextEncoding::Utf16), "Hi");

        let no_bom = [b'H', 0, b'i', 0];
        assert_eq!(decode_text(&no_bom, TextEncoding::Utf16), "Hi");

        assert_eq!(encode_text("Hi", TextEncoding::Utf16BE).unwrap(), vec![0, b'H', 0, b'i']);
    }

    #[test]
    fn test_trailing_nulls_stripped() {
        assert_eq!(decode_text(b"Song\0", TextEncoding::Iso8859_1), "Song");
        assert_eq!(decode_text(b"Song\0\0\0", TextEncoding::Utf8), "Song");
        let utf16 = [0xFF, 0xFE, b'A', 0, 0, 0];
        assert_eq!(decode_text(&utf16, TextEncoding::Utf16), "A");
    }

    #[test]
    fn test_odd_single_byte_terminator() {
        let utf16 = [0xFF, 0xFE, b'A', 0, 0];
        assert_eq!(decode_text(&utf16, TextEncoding::Utf16), "A");
        assert_eq!(decode_text(&[0, b'A', 0], TextEncoding::Utf16BE), "A");
        assert_eq!(decode_text(&[b'A', 0, 0], TextEncoding::Utf16), "A");
        // An odd byte that is not NUL stays a decoding error
        assert_eq!(decode_text(&[0xFF, 0xFE, b'A', 0, b'B'], TextEncoding::Utf16), "A\u{FFFD}");
    }

    #[test]
    fn test_latin1_rejects_wide_characters() {
        assert_eq!(encode_latin1("image/jpeg").unwrap(), b"image/jpeg".to_vec());
        assert_eq!(encode_latin1("é").unwrap(), vec![0xE9]);
        assert_eq!(encode_latin1("日本"), Err(Id3Error::InvalidCharacter('日')));
        assert_eq!(decode_latin1(&[0x93]), "\u{93}");
    }

    #[test]
    fn test_find_terminator() {
        let data = [b'a', b'b', 0, b'c', 0];
        assert_eq!(find_terminator(&data, 0, TextEncoding::Iso8859_1), Some(2));
        assert_eq!(find_terminator(&data, 3, TextEncoding::Utf8), Some(4));
        assert_eq!(find_terminator(b"abc", 0, TextEncoding::Iso8859_1), None);

        // "A" then terminator; the unaligned 00 00 straddling units is ignored
        let wide = [b'A', 0, 0, b'B', 0, 0];
        assert_eq!(find_terminator(&wide, 0, TextEncoding::Utf16), Some(4));
        assert_eq!(find_terminator(&wide, 1, TextEncoding::Utf16), Some(1));
        assert_eq!(find_terminator(&[b'A', 0, b'B'], 0, TextEncoding::Utf16BE), None);
        assert_eq!(find_terminator(&wide, 10, TextEncoding::Utf16), None);
    }
}
