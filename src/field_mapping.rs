// Metadata field mapping
//
// Every editable field of a `MetadataRecord` corresponds to exactly one
// ID3v2.3 frame id. The correspondence lives in a single table,
// `FIELD_FRAMES`, and both directions of the lookup are derived from it:
//
// - reading: frame id -> field (`Field::from_frame_id`)
// - writing: field -> frame id (`Field::frame_id`), in table order
//
// ID3v2.4 moved the year into the TDRC timestamp; the reader maps it onto
// the year field (`Field::from_frame`), the writer always emits TYER.
//
// Frame ids are also sorted into the three families the codec can decode
// (text information, comment, attached picture). Anything else is skipped.

/// Editable metadata fields, in the order the writer emits them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Album,
    Artists,
    Accompaniment,
    Conductor,
    Remixer,
    Composer,
    Publisher,
    Genre,
    ReleaseYear,
    TrackNumber,
    DiscNumber,
    Comments,
    Picture,
}

/// The one field <-> frame id table
pub const FIELD_FRAMES: [(Field, &str); 14] = [
    (Field::Title, "TIT2"),
    (Field::Album, "TALB"),
    (Field::Artists, "TPE1"),
    (Field::Accompaniment, "TPE2"),
    (Field::Conductor, "TPE3"),
    (Field::Remixer, "TPE4"),
    (Field::Composer, "TCOM"),
    (Field::Publisher, "TPUB"),
    (Field::Genre, "TCON"),
    (Field::ReleaseYear, "TYER"),
    (Field::TrackNumber, "TRCK"),
    (Field::DiscNumber, "TPOS"),
    (Field::Comments, "COMM"),
    (Field::Picture, "APIC"),
];

impl Field {
    /// All fields in table order
    pub fn all() -> impl Iterator<Item = Field> {
        FIELD_FRAMES.iter().map(|(field, _)| *field)
    }

    /// Frame id this field is stored in
    pub fn frame_id(self) -> &'static str {
        FIELD_FRAMES
            .iter()
            .find(|(field, _)| *field == self)
            .map(|(_, id)| *id)
            .unwrap_or_default()
    }

    /// Field stored in `frame_id`, if any
    pub fn from_frame_id(frame_id: &str) -> Option<Self> {
        FIELD_FRAMES
            .iter()
            .find(|(_, id)| *id == frame_id)
            .map(|(field, _)| *field)
    }

    /// Field stored in `frame_id` of a tag with the given major version
    pub fn from_frame(frame_id: &str, major: u8) -> Option<Self> {
        match frame_id {
            RECORDING_TIME_FRAME if major >= 4 => Some(Field::ReleaseYear),
            id => Self::from_frame_id(id),
        }
    }

    /// Canonical field name (snake case)
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Album => "album",
            Field::Artists => "artists",
            Field::Accompaniment => "accompaniment",
            Field::Conductor => "conductor",
            Field::Remixer => "remixer",
            Field::Composer => "composer",
            Field::Publisher => "publisher",
            Field::Genre => "genre",
            Field::ReleaseYear => "release_year",
            Field::TrackNumber => "track_number",
            Field::DiscNumber => "disc_number",
            Field::Comments => "comments",
            Field::Picture => "picture",
        }
    }

    /// Parse a field name, case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Field::all().find(|field| field.as_str() == name)
    }

    /// Whether the field holds a number rather than free text
    pub fn is_numeric(self) -> bool {
        matches!(self, Field::ReleaseYear | Field::TrackNumber | Field::DiscNumber)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text-information frames the decoder understands
pub const TEXT_INFO_FRAMES: [&str; 33] = [
    "TALB", "TBPM", "TCOM", "TCON", "TCOP", "TDAT", "TDLY", "TENC", "TEXT", "TFLT", "TIME",
    "TIT1", "TIT2", "TIT3", "TKEY", "TLAN", "TMED", "TYER", "TOAL", "TOFN", "TOLY", "TOPE",
    "TORY", "TOWN", "TPE1", "TPE2", "TPE3", "TPE4", "TPOS", "TPUB", "TRCK", "TSRC", "TSIZ",
];

/// ID3v2.4 recording time, `yyyy[-MM[-dd...]]`
pub const RECORDING_TIME_FRAME: &str = "TDRC";
pub const COMMENT_FRAME: &str = "COMM";
pub const PICTURE_FRAME: &str = "APIC";
pub const USER_TEXT_FRAME: &str = "TXXX";

/// Frame families, each with its own body layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameClass {
    TextInformation,
    Comment,
    AttachedPicture,
}

impl FrameClass {
    /// Classify a frame id, `None` for frames the codec skips
    pub fn of(frame_id: &str) -> Option<Self> {
        match frame_id {
            COMMENT_FRAME => Some(FrameClass::Comment),
            PICTURE_FRAME => Some(FrameClass::AttachedPicture),
            RECORDING_TIME_FRAME => Some(FrameClass::TextInformation),
            id if TEXT_INFO_FRAMES.contains(&id) => Some(FrameClass::TextInformation),
            _ => None,
        }
    }
}

/// Normalization of text values into record values
pub struct ValueConverter;

impl ValueConverter {
    /// Track/disc position, "3/12" -> "3"
    pub fn normalize_position(value: &str) -> &str {
        value.split('/').next().unwrap_or(value).trim()
    }

    /// Year of an ID3v2.4 timestamp, "1987-05-01T12:00" -> "1987"
    pub fn timestamp_year(value: &str) -> &str {
        let value = value.trim();
        match value.get(..4) {
            Some(year) if year.bytes().all(|b| b.is_ascii_digit()) => year,
            _ => value,
        }
    }

    /// Parse a year, track or disc number. Zero is not a valid position.
    pub fn parse_number(value: &str) -> Option<u32> {
        Self::normalize_position(value)
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_bidirectional() {
        for field in Field::all() {
            assert_eq!(Field::from_frame_id(field.frame_id()), Some(field));
        }
        let mut ids: Vec<_> = FIELD_FRAMES.iter().map(|(_, id)| *id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), FIELD_FRAMES.len());
    }

    #[test]
    fn test_field_names() {
        assert_eq!(Field::from_name("title"), Some(Field::Title));
        assert_eq!(Field::from_name("TITLE"), Some(Field::Title));
        assert_eq!(Field::from_name("Release_Year"), Some(Field::ReleaseYear));
        assert_eq!(Field::from_name("conductor"), Some(Field::Conductor));
        assert_eq!(Field::from_name("coductor"), None);
        assert_eq!(Field::Conductor.frame_id(), "TPE3");
        assert_eq!(Field::from_frame_id("TXXX"), None);
    }

    #[test]
    fn test_frame_classes() {
        assert_eq!(FrameClass::of("TIT2"), Some(FrameClass::TextInformation));
        assert_eq!(FrameClass::of("TBPM"), Some(FrameClass::TextInformation));
        assert_eq!(FrameClass::of("COMM"), Some(FrameClass::Comment));
        assert_eq!(FrameClass::of("APIC"), Some(FrameClass::AttachedPicture));
        assert_eq!(FrameClass::of("TXXX"), None);
        assert_eq!(FrameClass::of("PRIV"), None);
        for (field, id) in FIELD_FRAMES {
            assert!(FrameClass::of(id).is_some(), "{} has no decoder", field);
        }
    }

    #[test]
    fn test_value_normalization() {
        assert_eq!(ValueConverter::normalize_position("3/12"), "3");
        assert_eq!(ValueConverter::normalize_position("5"), "5");
        assert_eq!(ValueConverter::parse_number("3/12"), Some(3));
        assert_eq!(ValueConverter::parse_number(" 2024 "), Some(2024));
        assert_eq!(ValueConverter::parse_number("0"), None);
        assert_eq!(ValueConverter::parse_number("two"), None);
    }

    #[test]
    fn test_recording_time() {
        assert_eq!(Field::from_frame("TDRC", 4), Some(Field::ReleaseYear));
        assert_eq!(Field::from_frame("TDRC", 3), None);
        assert_eq!(Field::from_frame("TYER", 4), Some(Field::ReleaseYear));
        assert_eq!(FrameClass::of("TDRC"), Some(FrameClass::TextInformation));
        assert_eq!(ValueConverter::timestamp_year("1987"), "1987");
        assert_eq!(ValueConverter::timestamp_year("1987-05-01T12:00"), "1987");
        assert_eq!(ValueConverter::timestamp_year("87"), "87");
        assert_eq!(ValueConverter::timestamp_year("May 1987"), "May 1987");
    }
}
