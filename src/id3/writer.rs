// ID3v2.3 tag writer

use crate::error::Result;
use crate::field_mapping::Field;
use crate::id3::encode::{
    encode_comment_frame, encode_custom_text_frame, encode_picture_frame, encode_text_frame,
    DEFAULT_LANGUAGE,
};
use crate::id3::header::TagHeader;
use crate::metadata::MetadataRecord;
use crate::utils::synchsafe::length_to_u32;

/// Serializes a metadata record into a fresh ID3v2.3 tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagWriter {
    /// Stamped into a TXXX frame at the start of every tag
    pub generator: String,
    /// Language code of the comment frame
    pub language: String,
}

impl Default for TagWriter {
    fn default() -> Self {
        TagWriter {
            generator: format!("created with id3edit {}", env!("CARGO_PKG_VERSION")),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl TagWriter {
    pub fn new(generator: impl Into<String>) -> Self {
        TagWriter {
            generator: generator.into(),
            ..TagWriter::default()
        }
    }

    /// Encode the frames of `record`: the generator frame first, then one
    /// frame per populated field in table order. Empty text fields, an empty
    /// comment and a missing picture produce no frame.
    pub fn frames(&self, record: &MetadataRecord) -> Result<Vec<Vec<u8>>> {
        let mut frames = vec![encode_custom_text_frame("", &self.generator)?];

        for field in Field::all() {
            let frame = match field {
                Field::Comments if record.comments.is_empty() => continue,
                Field::Comments => encode_comment_frame(&record.comments, &self.language, "")?,
                Field::Picture => match &record.picture {
                    Some(picture) => encode_picture_frame(picture)?,
                    None => continue,
                },
                _ => match record.number(field) {
                    Some(number) => encode_text_frame(field.frame_id(), &number.to_string())?,
                    None => match record.text(field) {
                        Some(text) if !text.is_empty() => encode_text_frame(field.frame_id(), text)?,
                        _ => continue,
                    },
                },
            };
            frames.push(frame);
        }

        Ok(frames)
    }

    /// Build the complete tag (header + frames). Nothing is returned unless
    /// every frame encoded and the size fits the synchsafe range.
    pub fn write(&self, record: &MetadataRecord) -> Result<Vec<u8>> {
        let body = self.frames(record)?.concat();
        let header = TagHeader::v3(length_to_u32(body.len())?).to_bytes()?;

        let mut tag = Vec::with_capacity(header.len() + body.len());
        tag.extend_from_slice(&header);
        tag.extend(body);
        log::debug!("wrote {} byte ID3v2.3 tag", tag.len());
        Ok(tag)
    }
}
