//! id3edit - read, edit and rewrite ID3v2.3 metadata in MP3 files
//!
//! The core is a pure codec over byte buffers:
//!
//! - [`Id3v2Tag::read`] decodes a tag into a [`MetadataRecord`]
//! - [`MetadataRecord::apply`] takes edits as [`FieldUpdate`] messages
//! - [`TagWriter::write`] turns the record back into a complete ID3v2.3 tag
//!
//! [`AudioFile`] wraps the codec for files on disk: it splits a file into
//! tag and audio, and writes `new tag ++ original audio` back out.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod error;
pub mod field_mapping;
pub mod id3;
pub mod metadata;
pub mod utils;

pub use error::{Id3Error, Result};
pub use field_mapping::Field;
pub use id3::{FrameIssue, Id3v2Tag, TagWriter};
pub use metadata::{FieldUpdate, MetadataRecord, Picture};

/// MIME type of the files this crate produces
pub const OUTPUT_MIME_TYPE: &str = "audio/mpeg";

/// Errors of the file-level API
#[derive(Debug, Error)]
pub enum AudioFileError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Tag(#[from] Id3Error),
}

/// An MP3 file held in memory, split into its ID3v2 tag and audio
#[derive(Debug, Clone)]
pub struct AudioFile {
    pub path: PathBuf,
    bytes: Vec<u8>,
    tag: Id3v2Tag,
}

impl AudioFile {
    /// Read the whole file and decode its tag
    pub fn open(path: impl AsRef<Path>) -> std::result::Result<Self, AudioFileError> {
        let path = path.as_ref().to_path_buf();
        let bytes = fs::read(&path).map_err(|source| AudioFileError::Io {
            path: path.clone(),
            source,
        })?;
        log::debug!("read {} bytes from {}", bytes.len(), path.display());
        Ok(Self::from_bytes(path, bytes)?)
    }

    /// Decode a file that is already in memory
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Result<Self> {
        id3::v1::reject_id3v1_only(&bytes)?;
        let (_, tag_end) = id3::split_tag(&bytes)?;
        let tag = Id3v2Tag::read(&bytes[..tag_end])?;

        Ok(AudioFile {
            path: path.into(),
            bytes,
            tag,
        })
    }

    pub fn file_type(&self) -> &'static str {
        "ID3v2"
    }

    /// Tag version, e.g. "2.3.0"
    pub fn version(&self) -> String {
        self.tag.header.version()
    }

    /// Decoded metadata; the caller clones it to edit
    pub fn metadata(&self) -> &MetadataRecord {
        &self.tag.metadata
    }

    /// Frames that were skipped while decoding
    pub fn issues(&self) -> &[FrameIssue] {
        &self.tag.issues
    }

    /// Size of the tag, header included
    pub fn tag_size(&self) -> usize {
        self.tag.tag_end
    }

    /// Everything after the tag
    pub fn audio(&self) -> &[u8] {
        &self.bytes[self.tag.tag_end..]
    }

    /// New file contents: a fresh tag for `record` followed by the original audio
    pub fn render(&self, record: &MetadataRecord, writer: &TagWriter) -> Result<Vec<u8>> {
        let tag = writer.write(record)?;
        let audio = self.audio();

        let mut output = Vec::with_capacity(tag.len() + audio.len());
        output.extend(tag);
        output.extend_from_slice(audio);
        Ok(output)
    }

    /// Render and write to `path`. Nothing is written if encoding fails.
    ///
    /// The new contents go to a temporary file next to `path`, which then
    /// replaces `path` in one rename. A failed write leaves `path` untouched.
    pub fn save(
        &self,
        record: &MetadataRecord,
        writer: &TagWriter,
        path: impl AsRef<Path>,
    ) -> std::result::Result<(), AudioFileError> {
        let path = path.as_ref();
        let output = self.render(record, writer)?;
        let io_error = |source: std::io::Error| AudioFileError::Io {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = tempfile::Builder::new()
            .prefix(".id3edit-")
            .tempfile_in(dir)
            .map_err(io_error)?;
        staged.write_all(&output).map_err(io_error)?;
        staged.as_file().sync_all().map_err(io_error)?;
        if let Ok(existing) = fs::metadata(path) {
            fs::set_permissions(staged.path(), existing.permissions()).map_err(io_error)?;
        }
        staged.persist(path).map_err(|e| io_error(e.error))?;

        log::info!("wrote {} bytes to {}", output.len(), path.display());
        Ok(())
    }
}
