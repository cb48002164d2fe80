// ID3v2 tag reader
//
// The reader is a small state machine:
//
//   AtTagHeader -> ScanningFrames -> Done
//
// A bad tag header aborts the read. Once frames are being scanned, a broken
// frame only costs its own field: the error is logged, recorded as a
// `FrameIssue`, and the field keeps its default value.

use crate::error::{Id3Error, Result};
use crate::field_mapping::{Field, FrameClass, ValueConverter, RECORDING_TIME_FRAME};
use crate::id3::decode::{decode_comment_frame, decode_picture_frame, decode_text_frame};
use crate::id3::frame::{is_valid_frame_id, FrameHeader};
use crate::id3::header::{TagHeader, HEADER_SIZE};
use crate::id3::picture::PictureType;
use crate::metadata::{FieldUpdate, MetadataRecord};

/// Joins the values of a multi-value ID3v2.4 text frame
const VALUE_SEPARATOR: &str = "; ";

/// A frame that could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameIssue {
    pub frame_id: String,
    /// Offset of the frame header within the tag
    pub offset: usize,
    pub error: Id3Error,
}

/// ID3v2 tag structure
#[derive(Debug, Clone)]
pub struct Id3v2Tag {
    pub header: TagHeader,
    /// Offset where the audio data starts
    pub tag_end: usize,
    pub metadata: MetadataRecord,
    pub issues: Vec<FrameIssue>,
}

enum ReaderState {
    AtTagHeader,
    ScanningFrames {
        header: TagHeader,
        cursor: usize,
        end: usize,
    },
    Done {
        header: TagHeader,
    },
}

impl Id3v2Tag {
    /// Read an ID3v2 tag from the start of `bytes`.
    ///
    /// `bytes` may hold the whole file or only the tag; scanning stops at
    /// whichever ends first.
    pub fn read(bytes: &[u8]) -> Result<Self> {
        let mut metadata = MetadataRecord::default();
        let mut issues = Vec::new();
        let mut state = ReaderState::AtTagHeader;

        let header = loop {
            state = match state {
                ReaderState::AtTagHeader => {
                    let header = TagHeader::parse(bytes)?;
                    if header.unsynchronised() {
                        return Err(Id3Error::UnsupportedFeature("unsynchronisation"));
                    }
                    let cursor = header.frames_start(bytes)?;
                    let end = header.tag_end().min(bytes.len());
                    log::debug!(
                        "ID3v{} tag, {} bytes, frames at {}",
                        header.version(),
                        header.size,
                        cursor
                    );
                    ReaderState::ScanningFrames {
                        header,
                        cursor,
                        end,
                    }
                }
                ReaderState::ScanningFrames {
                    header,
                    cursor,
                    end,
                } => match next_frame(bytes, &header, cursor, end) {
                    Step::Frame { frame, body_end } => {
                        let body = &bytes[cursor + HEADER_SIZE..body_end];
                        if let Err(error) = apply_frame(&mut metadata, &frame, body, header.major) {
                            log::warn!("skipping {} frame at {}: {}", frame.id, cursor, error);
                            issues.push(FrameIssue {
                                frame_id: frame.id,
                                offset: cursor,
                                error,
                            });
                        }
                        ReaderState::ScanningFrames {
                            header,
                            cursor: body_end,
                            end,
                        }
                    }
                    Step::Stop(issue) => {
                        if let Some(issue) = issue {
                            log::warn!("truncating frame scan at {}: {}", issue.offset, issue.error);
                            issues.push(issue);
                        }
                        ReaderState::Done { header }
                    }
                },
                ReaderState::Done { header } => break header,
            };
        };

        Ok(Id3v2Tag {
            header,
            tag_end: header.tag_end(),
            metadata,
            issues,
        })
    }
}

/// Decode only the metadata record of a tag
pub fn read_metadata(bytes: &[u8]) -> Result<MetadataRecord> {
    Id3v2Tag::read(bytes).map(|tag| tag.metadata)
}

enum Step {
    Frame { frame: FrameHeader, body_end: usize },
    Stop(Option<FrameIssue>),
}

fn next_frame(bytes: &[u8], header: &TagHeader, cursor: usize, end: usize) -> Step {
    // Padding, or not even room for another frame header
    if cursor.saturating_add(HEADER_SIZE) > end || bytes[cursor] == 0 {
        return Step::Stop(None);
    }

    let frame = match FrameHeader::parse(&bytes[cursor..end], header.major) {
        Ok(frame) => frame,
        Err(error) => {
            return Step::Stop(Some(FrameIssue {
                frame_id: String::new(),
                offset: cursor,
                error,
            }))
        }
    };

    if !is_valid_frame_id(&frame.id) {
        return Step::Stop(Some(FrameIssue {
            error: Id3Error::malformed(&frame.id, "invalid frame id"),
            frame_id: frame.id,
            offset: cursor,
        }));
    }

    let body_end = cursor.saturating_add(frame.total_len());
    if body_end > end {
        return Step::Stop(Some(FrameIssue {
            error: Id3Error::malformed(&frame.id, "frame size overruns the tag"),
            frame_id: frame.id,
            offset: cursor,
        }));
    }

    Step::Frame { frame, body_end }
}

/// Decode one frame into the record. The record is only touched once the
/// frame has been decoded completely.
fn apply_frame(metadata: &mut MetadataRecord, frame: &FrameHeader, body: &[u8], major: u8) -> Result<()> {
    let (Some(class), Some(field)) = (FrameClass::of(&frame.id), Field::from_frame(&frame.id, major)) else {
        log::debug!("ignoring {} frame, {} bytes", frame.id, frame.size);
        return Ok(());
    };

    if let Some(reason) = frame.unsupported_flag(major) {
        return Err(Id3Error::UnsupportedFeature(reason));
    }

    match class {
        FrameClass::TextInformation => {
            let mut text = decode_text_frame(&frame.id, body)?;
            if major >= 4 {
                text = join_values(&text);
            }
            if frame.id == RECORDING_TIME_FRAME {
                text = ValueConverter::timestamp_year(&text).to_string();
            }
            log::debug!("{} = {:?}", frame.id, text);
            metadata.apply(FieldUpdate::new(field, text))?;
        }
        FrameClass::Comment => {
            let comment = decode_comment_frame(body)?;
            // Players stash private data in described comments, prefer the plain one
            if comment.description.is_empty() || metadata.comments.is_empty() {
                metadata.comments = comment.text;
            }
        }
        FrameClass::AttachedPicture => {
            let picture = decode_picture_frame(body)?;
            log::debug!("{} picture, {} bytes", picture.mime_type, picture.data.len());
            let is_front = picture.picture_type == PictureType::CoverFront as u8;
            let have_front = metadata
                .picture
                .as_ref()
                .is_some_and(|p| p.picture_type == PictureType::CoverFront as u8);
            if metadata.picture.is_none() || (is_front && !have_front) {
                metadata.set_picture(Some(picture));
            }
        }
    }

    Ok(())
}

/// ID3v2.4 text frames may hold several NUL-separated values
fn join_values(text: &str) -> String {
    text.split('\0')
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(VALUE_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id3::encode::{encode_comment_frame, encode_picture_frame, encode_text_frame};
    use crate::metadata::Picture;
    use crate::utils::synchsafe::encode_synchsafe;
    use pretty_assertions::assert_eq;

    fn tag(frames: &[Vec<u8>], padding: usize) -> Vec<u8> {
        let body: Vec<u8> = frames.concat();
        let size = (body.len() + padding) as u32;
        let mut bytes = b"ID3\x03\x00\x00".to_vec();
        bytes.extend_from_slice(&encode_synchsafe(size).unwrap());
        bytes.extend(body);
        bytes.extend(std::iter::repeat(0).take(padding));
        bytes
    }

    fn raw_frame(id: &str, body: &[u8]) -> Vec<u8> {
        let mut frame = id.as_bytes().to_vec();
        frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
        frame.extend_from_slice(&[0, 0]);
        frame.extend_from_slice(body);
        frame
    }

    #[test]
    fn test_reads_title() {
        let bytes = tag(&[encode_text_frame("TIT2", "Test Song").unwrap()], 0);
        let tag = Id3v2Tag::read(&bytes).unwrap();
        assert_eq!(tag.metadata.title, "Test Song");
        assert_eq!(tag.tag_end, bytes.len());
        assert!(tag.issues.is_empty());
    }

    #[test]
    fn test_track_of_total() {
        let bytes = tag(
            &[
                raw_frame("TRCK", b"\x003/12"),
                raw_frame("TPOS", b"\x002/2\0"),
            ],
            0,
        );
        let metadata = read_metadata(&bytes).unwrap();
        assert_eq!(metadata.track_number, 3);
        assert_eq!(metadata.disc_number, 2);
    }

    #[test]
    fn test_defaults_when_frames_absent() {
        let bytes = tag(&[raw_frame("TALB", b"\0Album")], 64);
        let metadata = read_metadata(&bytes).unwrap();
        let expected = MetadataRecord {
            album: "Album".to_string(),
            ..MetadataRecord::default()
        };
        assert_eq!(metadata, expected);
    }

    #[test]
    fn test_full_record() {
        let jpeg = vec![0xFF, 0xD8, 0x42, 0xFF, 0xD9];
        let bytes = tag(
            &[
                raw_frame("TXXX", b"\0gen\0id3edit"),
                encode_text_frame("TPE1", "Artist").unwrap(),
                encode_text_frame("TPE3", "Conductor").unwrap(),
                raw_frame("TBPM", b"\0120"),
                raw_frame("PRIV", b"opaque"),
                encode_text_frame("TYER", "1987").unwrap(),
                encode_comment_frame("Hello", "eng", "").unwrap(),
                encode_picture_frame(&Picture::new(jpeg.clone(), "image/jpeg")).unwrap(),
            ],
            10,
        );
        let tag = Id3v2Tag::read(&bytes).unwrap();
        let metadata = tag.metadata;
        assert_eq!(metadata.artists, "Artist");
        assert_eq!(metadata.conductor, "Conductor");
        assert_eq!(metadata.release_year, 1987);
        assert_eq!(metadata.comments, "Hello");
        assert_eq!(metadata.picture.unwrap().data, jpeg);
        assert!(tag.issues.is_empty());
    }

    #[test]
    fn test_invalid_magic() {
        let mut bytes = tag(&[encode_text_frame("TIT2", "x").unwrap()], 0);
        bytes[2] = b'2';
        assert!(matches!(Id3v2Tag::read(&bytes), Err(Id3Error::InvalidTag(_))));
    }

    #[test]
    fn test_unsynchronised_tag_is_refused() {
        let mut bytes = tag(&[], 4);
        bytes[5] = 0x80;
        assert_eq!(
            Id3v2Tag::read(&bytes).unwrap_err(),
            Id3Error::UnsupportedFeature("unsynchronisation")
        );
    }

    #[test]
    fn test_overrunning_frame_truncates_scan() {
        let mut overrun = raw_frame("TALB", b"\0Lost");
        overrun[7] = 200;
        let bytes = tag(&[encode_text_frame("TIT2", "Kept").unwrap(), overrun], 0);

        let tag = Id3v2Tag::read(&bytes).unwrap();
        assert_eq!(tag.metadata.title, "Kept");
        assert_eq!(tag.metadata.album, "");
        assert_eq!(tag.issues.len(), 1);
        assert_eq!(tag.issues[0].frame_id, "TALB");
    }

    #[test]
    fn test_broken_frame_keeps_default_and_continues() {
        let bytes = tag(
            &[
                raw_frame("COMM", b"\0engno terminator"),
                raw_frame("TRCK", b"\0side A"),
                raw_frame("APIC", b"\0image/gif\0\x03\0GIF89a"),
                raw_frame("TIT2", b"\0After"),
            ],
            0,
        );
        let tag = Id3v2Tag::read(&bytes).unwrap();
        assert_eq!(tag.metadata.comments, "");
        assert_eq!(tag.metadata.track_number, 1);
        assert_eq!(tag.metadata.picture, None);
        assert_eq!(tag.metadata.title, "After");
        let ids: Vec<_> = tag.issues.iter().map(|i| i.frame_id.as_str()).collect();
        assert_eq!(ids, vec!["COMM", "TRCK", "APIC"]);
        assert_eq!(
            tag.issues[2].error,
            Id3Error::UnsupportedImageFormat("image/gif".to_string())
        );
    }

    #[test]
    fn test_compressed_frame_is_skipped() {
        let mut compressed = raw_frame("TIT2", b"\0zzz");
        compressed[9] = 0x80;
        let bytes = tag(&[compressed, raw_frame("TALB", b"\0Album")], 0);
        let tag = Id3v2Tag::read(&bytes).unwrap();
        assert_eq!(tag.metadata.title, "");
        assert_eq!(tag.metadata.album, "Album");
        assert_eq!(tag.issues[0].error, Id3Error::UnsupportedFeature("compressed frame"));
    }

    #[test]
    fn test_described_comment_does_not_replace_plain_one() {
        let bytes = tag(
            &[
                encode_comment_frame("real", "eng", "").unwrap(),
                encode_comment_frame("0000 0000", "eng", "iTunNORM").unwrap(),
            ],
            0,
        );
        assert_eq!(read_metadata(&bytes).unwrap().comments, "real");
    }

    #[test]
    fn test_front_cover_preferred() {
        let mut back = Picture::new(vec![0xFF, 0xD8, 0x01, 0xFF, 0xD9], "image/jpeg");
        back.picture_type = PictureType::CoverBack as u8;
        let front = Picture::new(vec![0xFF, 0xD8, 0x02, 0xFF, 0xD9], "image/jpeg");
        let bytes = tag(
            &[
                encode_picture_frame(&back).unwrap(),
                encode_picture_frame(&front).unwrap(),
            ],
            0,
        );
        assert_eq!(read_metadata(&bytes).unwrap().picture, Some(front));
    }

    #[test]
    fn test_v4_tag_with_synchsafe_frame_sizes() {
        let mut body = b"TIT2".to_vec();
        body.extend_from_slice(&encode_synchsafe(200).unwrap());
        body.extend_from_slice(&[0, 0, 3]);
        body.extend(std::iter::repeat(b'a').take(199));

        let mut bytes = b"ID3\x04\x00\x00".to_vec();
        bytes.extend_from_slice(&encode_synchsafe(body.len() as u32).unwrap());
        bytes.extend(body);

        let tag = Id3v2Tag::read(&bytes).unwrap();
        assert_eq!(tag.metadata.title, "a".repeat(199));
        assert_eq!(tag.header.version(), "2.4.0");
    }

    fn v4_frame(id: &str, body: &[u8]) -> Vec<u8> {
        let mut frame = id.as_bytes().to_vec();
        frame.extend_from_slice(&encode_synchsafe(body.len() as u32).unwrap());
        frame.extend_from_slice(&[0, 0]);
        frame.extend_from_slice(body);
        frame
    }

    fn v4_tag(frames: &[Vec<u8>]) -> Vec<u8> {
        let body = frames.concat();
        let mut bytes = b"ID3\x04\x00\x00".to_vec();
        bytes.extend_from_slice(&encode_synchsafe(body.len() as u32).unwrap());
        bytes.extend(body);
        bytes
    }

    #[test]
    fn test_v4_recording_time_is_the_year() {
        let tag = Id3v2Tag::read(&v4_tag(&[v4_frame("TDRC", b"\x031987")])).unwrap();
        assert_eq!(tag.metadata.release_year, 1987);
        assert!(tag.issues.is_empty());

        let tag = Id3v2Tag::read(&v4_tag(&[v4_frame("TDRC", b"\x031969-07-20T20:17")])).unwrap();
        assert_eq!(tag.metadata.release_year, 1969);

        let tag = Id3v2Tag::read(&v4_tag(&[v4_frame("TDRC", b"\x03someday")])).unwrap();
        assert_eq!(tag.metadata.release_year, MetadataRecord::default().release_year);
        assert_eq!(tag.issues.len(), 1);
        assert_eq!(tag.issues[0].frame_id, "TDRC");
    }

    #[test]
    fn test_recording_time_ignored_in_v3() {
        let bytes = tag(&[raw_frame("TDRC", b"\x001987"), raw_frame("TYER", b"\x002001")], 0);
        let tag = Id3v2Tag::read(&bytes).unwrap();
        assert_eq!(tag.metadata.release_year, 2001);
        assert!(tag.issues.is_empty());
    }

    #[test]
    fn test_v4_multiple_values() {
        let bytes = v4_tag(&[
            v4_frame("TPE1", b"\x03Miles Davis\0John Coltrane\0"),
            v4_frame("TRCK", b"\x034/9"),
        ]);
        let metadata = read_metadata(&bytes).unwrap();
        assert_eq!(metadata.artists, "Miles Davis; John Coltrane");
        assert_eq!(metadata.track_number, 4);
    }

    #[test]
    fn test_v4_rewritten_as_v3() {
        use crate::id3::writer::TagWriter;

        let bytes = v4_tag(&[
            v4_frame("TIT2", b"\x03So What"),
            v4_frame("TDRC", b"\x031959-08-17"),
            v4_frame("TPE1", b"\x03Miles Davis"),
        ]);
        let original = read_metadata(&bytes).unwrap();
        let rewritten = TagWriter::default().write(&original).unwrap();
        assert_eq!(&rewritten[..4], b"ID3\x03");

        let reread = Id3v2Tag::read(&rewritten).unwrap();
        assert_eq!(reread.header.version(), "2.3.0");
        assert_eq!(reread.metadata, original);
        assert_eq!(reread.metadata.release_year, 1959);
    }

    #[test]
    fn test_utf16_text_with_odd_terminator() {
        let bytes = tag(&[raw_frame("TIT2", &[0x01, 0xFF, 0xFE, b'A', 0x00, 0x00])], 0);
        assert_eq!(read_metadata(&bytes).unwrap().title, "A");
    }

    #[test]
    fn test_huge_frame_size_truncates_scan() {
        let mut frame = b"TIT2".to_vec();
        frame.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, b'x']);
        let tag = Id3v2Tag::read(&tag(&[frame], 0)).unwrap();
        assert_eq!(tag.metadata.title, "");
        assert_eq!(tag.issues.len(), 1);
        assert_eq!(tag.issues[0].frame_id, "TIT2");
    }
}
