// Frame body encoders
//
// Every encoder returns a complete frame (header + body). Strings are
// written as UTF-16 with a little-endian BOM (encoding byte 0x01), ids,
// language codes and MIME types as Latin-1.

use crate::error::Result;
use crate::field_mapping::{COMMENT_FRAME, PICTURE_FRAME, USER_TEXT_FRAME};
use crate::id3::frame::build_frame_header;
use crate::id3::picture::ImageFormat;
use crate::metadata::Picture;
use crate::utils::encoding::{encode_latin1, encode_text, TextEncoding};

const ENCODING: TextEncoding = TextEncoding::Utf16;
const UTF16_TERMINATOR: [u8; 2] = [0x00, 0x00];

/// Default comment language
pub const DEFAULT_LANGUAGE: &str = "eng";

fn frame(id: &str, body: Vec<u8>) -> Result<Vec<u8>> {
    let header = build_frame_header(id, body.len(), 0)?;
    let mut frame = Vec::with_capacity(header.len() + body.len());
    frame.extend_from_slice(&header);
    frame.extend(body);
    log::debug!("encoded {} frame, {} byte body", id, frame.len() - header.len());
    Ok(frame)
}

/// Text-information frame
pub fn encode_text_frame(frame_id: &str, text: &str) -> Result<Vec<u8>> {
    let encoded = encode_text(text, ENCODING)?;
    let mut body = Vec::with_capacity(1 + encoded.len());
    body.push(ENCODING.as_byte());
    body.extend(encoded);
    frame(frame_id, body)
}

/// User-defined text frame (TXXX): description, terminator, value
pub fn encode_custom_text_frame(description: &str, value: &str) -> Result<Vec<u8>> {
    let mut body = vec![ENCODING.as_byte()];
    body.extend(encode_text(description, ENCODING)?);
    body.extend_from_slice(&UTF16_TERMINATOR);
    body.extend(encode_text(value, ENCODING)?);
    frame(USER_TEXT_FRAME, body)
}

/// Comment frame. The language is cut or space-padded to 3 bytes.
pub fn encode_comment_frame(comment: &str, language: &str, description: &str) -> Result<Vec<u8>> {
    let mut language = encode_latin1(language)?;
    language.resize(3, b' ');

    let mut body = vec![ENCODING.as_byte()];
    body.extend(language);
    body.extend(encode_text(description, ENCODING)?);
    body.extend_from_slice(&UTF16_TERMINATOR);
    body.extend(encode_text(comment, ENCODING)?);
    frame(COMMENT_FRAME, body)
}

/// Attached picture frame; the image bytes are copied verbatim
pub fn encode_picture_frame(picture: &Picture) -> Result<Vec<u8>> {
    ImageFormat::from_mime(&picture.mime_type)?;

    let mut body = vec![ENCODING.as_byte()];
    body.extend(encode_latin1(&picture.mime_type)?);
    body.push(0x00);
    body.push(picture.picture_type);
    body.extend(encode_text(&picture.description, ENCODING)?);
    body.extend_from_slice(&UTF16_TERMINATOR);
    body.extend_from_slice(&picture.data);
    frame(PICTURE_FRAME, body)
}
