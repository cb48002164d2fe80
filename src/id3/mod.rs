// ID3 metadata handling module
pub mod decode;
pub mod encode;
pub mod frame;
pub mod header;
pub mod picture;
pub mod v1;
pub mod v2;
pub mod writer;

pub use header::{split_tag, TagHeader};
pub use v2::{read_metadata, FrameIssue, Id3v2Tag};
pub use writer::TagWriter;
