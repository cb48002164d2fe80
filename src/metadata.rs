// In-memory metadata record
//
// A record is created by decoding a tag, edited through `FieldUpdate`
// messages, and handed to the tag writer once.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::{Id3Error, Result};
use crate::field_mapping::{Field, ValueConverter};
use crate::id3::picture::PictureType;

/// Embedded cover image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    pub mime_type: String,
    /// APIC picture type byte, 0x03 is the front cover
    #[serde(default = "default_picture_type")]
    pub picture_type: u8,
    #[serde(default)]
    pub description: String,
    /// Raw image bytes, base64 in serialized form
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

fn default_picture_type() -> u8 {
    PictureType::CoverFront as u8
}

impl Picture {
    /// Front cover picture without description
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Picture {
            mime_type: mime_type.into(),
            picture_type: default_picture_type(),
            description: String::new(),
            data,
        }
    }

    /// File extension matching the MIME type
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            _ => "jpg",
        }
    }
}

/// Decoded metadata of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataRecord {
    pub title: String,
    pub album: String,
    pub artists: String,
    pub accompaniment: String,
    pub conductor: String,
    pub remixer: String,
    pub composer: String,
    pub publisher: String,
    pub genre: String,
    pub release_year: u32,
    pub track_number: u32,
    pub disc_number: u32,
    pub comments: String,
    pub picture: Option<Picture>,
}

impl Default for MetadataRecord {
    fn default() -> Self {
        MetadataRecord {
            title: String::new(),
            album: String::new(),
            artists: String::new(),
            accompaniment: String::new(),
            conductor: String::new(),
            remixer: String::new(),
            composer: String::new(),
            publisher: String::new(),
            genre: String::new(),
            release_year: current_year(),
            track_number: 1,
            disc_number: 1,
            comments: String::new(),
            picture: None,
        }
    }
}

fn current_year() -> u32 {
    u32::try_from(chrono::Local::now().year()).unwrap_or(1970)
}

/// A single edit coming from the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUpdate {
    pub field: Field,
    pub value: String,
}

impl FieldUpdate {
    pub fn new(field: Field, value: impl Into<String>) -> Self {
        FieldUpdate {
            field,
            value: value.into(),
        }
    }

    /// Parse `name=value`
    pub fn parse(assignment: &str) -> Result<Self> {
        let (name, value) = assignment.split_once('=').ok_or_else(|| {
            Id3Error::InvalidFieldValue {
                field: "assignment",
                value: assignment.to_string(),
            }
        })?;
        let field = Field::from_name(name).ok_or_else(|| Id3Error::InvalidFieldValue {
            field: "name",
            value: name.to_string(),
        })?;
        Ok(FieldUpdate::new(field, value))
    }
}

impl MetadataRecord {
    /// Apply an edit. Numeric fields must hold a positive integer, pictures
    /// are set through [`MetadataRecord::set_picture`].
    pub fn apply(&mut self, update: FieldUpdate) -> Result<()> {
        let field = update.field;
        if field.is_numeric() {
            let number = ValueConverter::parse_number(&update.value).ok_or_else(|| {
                Id3Error::InvalidFieldValue {
                    field: field.as_str(),
                    value: update.value.clone(),
                }
            })?;
            match field {
                Field::ReleaseYear => self.release_year = number,
                Field::TrackNumber => self.track_number = number,
                _ => self.disc_number = number,
            }
            return Ok(());
        }

        match self.text_mut(field) {
            Some(slot) => {
                *slot = update.value;
                Ok(())
            }
            None => Err(Id3Error::InvalidFieldValue {
                field: field.as_str(),
                value: update.value,
            }),
        }
    }

    pub fn set_picture(&mut self, picture: Option<Picture>) {
        self.picture = picture;
    }

    /// Display value of a field
    pub fn get(&self, field: Field) -> String {
        match field {
            Field::ReleaseYear => self.release_year.to_string(),
            Field::TrackNumber => self.track_number.to_string(),
            Field::DiscNumber => self.disc_number.to_string(),
            Field::Picture => self
                .picture
                .as_ref()
                .map(|p| format!("{}, {} bytes", p.mime_type, p.data.len()))
                .unwrap_or_default(),
            _ => self.text(field).unwrap_or_default().to_string(),
        }
    }

    /// Free-text fields, `None` for numbers and the picture
    pub fn text(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::Title => &self.title,
            Field::Album => &self.album,
            Field::Artists => &self.artists,
            Field::Accompaniment => &self.accompaniment,
            Field::Conductor => &self.conductor,
            Field::Remixer => &self.remixer,
            Field::Composer => &self.composer,
            Field::Publisher => &self.publisher,
            Field::Genre => &self.genre,
            Field::Comments => &self.comments,
            _ => return None,
        };
        Some(value.as_str())
    }

    pub(crate) fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Title => Some(&mut self.title),
            Field::Album => Some(&mut self.album),
            Field::Artists => Some(&mut self.artists),
            Field::Accompaniment => Some(&mut self.accompaniment),
            Field::Conductor => Some(&mut self.conductor),
            Field::Remixer => Some(&mut self.remixer),
            Field::Composer => Some(&mut self.composer),
            Field::Publisher => Some(&mut self.publisher),
            Field::Genre => Some(&mut self.genre),
            Field::Comments => Some(&mut self.comments),
            _ => None,
        }
    }

    /// Number of a numeric field
    pub fn number(&self, field: Field) -> Option<u32> {
        match field {
            Field::ReleaseYear => Some(self.release_year),
            Field::TrackNumber => Some(self.track_number),
            Field::DiscNumber => Some(self.disc_number),
            _ => None,
        }
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
