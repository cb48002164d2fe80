// Frame body decoders
//
// Each decoder receives the frame body (the bytes after the 10-byte frame
// header) and never looks past it.

use crate::error::{Id3Error, Result};
use crate::field_mapping::{COMMENT_FRAME, PICTURE_FRAME};
use crate::id3::picture::{extract_image, ImageFormat};
use crate::metadata::Picture;
use crate::utils::encoding::{decode_latin1, decode_text, find_terminator, TextEncoding};

/// Decoded COMM frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub language: String,
    pub description: String,
    pub text: String,
}

/// Read the leading encoding byte of a body
fn body_encoding(frame_id: &str, body: &[u8]) -> Result<TextEncoding> {
    let byte = *body
        .first()
        .ok_or_else(|| Id3Error::malformed(frame_id, "empty frame body"))?;
    TextEncoding::from_byte(byte).ok_or_else(|| Id3Error::malformed(frame_id, "unknown text encoding"))
}

/// Decode a text-information frame: encoding byte followed by the text
pub fn decode_text_frame(frame_id: &str, body: &[u8]) -> Result<String> {
    let encoding = body_encoding(frame_id, body)?;
    Ok(decode_text(&body[1..], encoding))
}

/// Decode a COMM frame: encoding, 3-byte language, terminated description, text
pub fn decode_comment_frame(body: &[u8]) -> Result<Comment> {
    let encoding = body_encoding(COMMENT_FRAME, body)?;
    if body.len() < 4 {
        return Err(Id3Error::malformed(COMMENT_FRAME, "missing language code"));
    }
    let language = decode_latin1(&body[1..4]);

    let description_end = find_terminator(body, 4, encoding)
        .ok_or_else(|| Id3Error::malformed(COMMENT_FRAME, "description terminator not found"))?;
    let description = decode_text(&body[4..description_end], encoding);
    let text = decode_text(&body[description_end + encoding.terminator_len()..], encoding);

    Ok(Comment {
        language,
        description,
        text,
    })
}

/// Decode an APIC frame.
///
/// encoding | MIME type, NUL terminated | picture type | description,
/// terminated | image data
pub fn decode_picture_frame(body: &[u8]) -> Result<Picture> {
    let encoding = body_encoding(PICTURE_FRAME, body)?;

    let mime_end = find_terminator(body, 1, TextEncoding::Iso8859_1)
        .ok_or_else(|| Id3Error::malformed(PICTURE_FRAME, "MIME type terminator not found"))?;
    let mime_type = decode_latin1(&body[1..mime_end]);
    let format = ImageFormat::from_mime(&mime_type)?;

    let type_pos = mime_end + 1;
    let picture_type = *body
        .get(type_pos)
        .ok_or_else(|| Id3Error::malformed(PICTURE_FRAME, "missing picture type"))?;

    let description_start = type_pos + 1;
    let description_end = find_terminator(body, description_start, encoding)
        .ok_or_else(|| Id3Error::malformed(PICTURE_FRAME, "description terminator not found"))?;
    let description = decode_text(&body[description_start..description_end], encoding);

    let data = extract_image(&body[description_end + encoding.terminator_len()..], format)?;

    Ok(Picture {
        mime_type: format.mime_type().to_string(),
        picture_type,
        description,
        data: data.to_vec(),
    })
}
