// Attached-picture helpers: picture types and image boundary detection

use crate::error::{Id3Error, Result};

pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];
const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Picture types of the APIC frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureType {
    Other = 0,
    FileIcon = 1,
    OtherFileIcon = 2,
    CoverFront = 3,
    CoverBack = 4,
    LeafletPage = 5,
    Media = 6,
    LeadArtist = 7,
    Artist = 8,
    Conductor = 9,
    Band = 10,
    Composer = 11,
    Lyricist = 12,
    RecordingLocation = 13,
    DuringRecording = 14,
    DuringPerformance = 15,
    VideoScreenCapture = 16,
    BrightColouredFish = 17,
    Illustration = 18,
    BandLogo = 19,
    PublisherLogo = 20,
}

impl PictureType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => PictureType::FileIcon,
            2 => PictureType::OtherFileIcon,
            3 => PictureType::CoverFront,
            4 => PictureType::CoverBack,
            5 => PictureType::LeafletPage,
            6 => PictureType::Media,
            7 => PictureType::LeadArtist,
            8 => PictureType::Artist,
            9 => PictureType::Conductor,
            10 => PictureType::Band,
            11 => PictureType::Composer,
            12 => PictureType::Lyricist,
            13 => PictureType::RecordingLocation,
            14 => PictureType::DuringRecording,
            15 => PictureType::DuringPerformance,
            16 => PictureType::VideoScreenCapture,
            17 => PictureType::BrightColouredFish,
            18 => PictureType::Illustration,
            19 => PictureType::BandLogo,
            20 => PictureType::PublisherLogo,
            _ => PictureType::Other,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PictureType::Other => "Other",
            PictureType::FileIcon => "File Icon",
            PictureType::OtherFileIcon => "Other File Icon",
            PictureType::CoverFront => "Cover (front)",
            PictureType::CoverBack => "Cover (back)",
            PictureType::LeafletPage => "Leaflet page",
            PictureType::Media => "Media",
            PictureType::LeadArtist => "Lead artist",
            PictureType::Artist => "Artist",
            PictureType::Conductor => "Conductor",
            PictureType::Band => "Band",
            PictureType::Composer => "Composer",
            PictureType::Lyricist => "Lyricist",
            PictureType::RecordingLocation => "Recording Location",
            PictureType::DuringRecording => "During recording",
            PictureType::DuringPerformance => "During performance",
            PictureType::VideoScreenCapture => "Video screen capture",
            PictureType::BrightColouredFish => "Bright coloured fish",
            PictureType::Illustration => "Illustration",
            PictureType::BandLogo => "Band logo",
            PictureType::PublisherLogo => "Publisher logo",
        }
    }
}

/// Supported image containers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Map a declared MIME type; "image/jpg" shows up in the wild
    pub fn from_mime(mime_type: &str) -> Result<Self> {
        match mime_type.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Ok(ImageFormat::Jpeg),
            "image/png" => Ok(ImageFormat::Png),
            _ => Err(Id3Error::UnsupportedImageFormat(mime_type.to_string())),
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => MIME_JPEG,
            ImageFormat::Png => MIME_PNG,
        }
    }
}

/// Detect JPEG or PNG data by its leading signature
pub fn sniff_image_mime(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&PNG_SIGNATURE) {
        Some(MIME_PNG)
    } else if data.starts_with(&JPEG_SOI) {
        Some(MIME_JPEG)
    } else {
        None
    }
}

/// Locate the image stream inside the picture-data part of an APIC body.
///
/// JPEG runs from the start-of-image marker through the last end-of-image
/// marker, so bytes trailing the image are dropped. PNG runs from the
/// signature to the end of the frame.
pub fn extract_image(data: &[u8], format: ImageFormat) -> Result<&[u8]> {
    match format {
        ImageFormat::Jpeg => {
            let start = find(data, &JPEG_SOI)
                .ok_or_else(|| Id3Error::malformed("APIC", "JPEG start-of-image marker not found"))?;
            let image = &data[start..];
            let end = image
                .windows(JPEG_EOI.len())
                .skip(JPEG_SOI.len())
                .rposition(|window| window == JPEG_EOI)
                .map(|i| i + JPEG_SOI.len() + JPEG_EOI.len());
            match end {
                Some(end) => Ok(&image[..end]),
                None => {
                    log::warn!("JPEG end-of-image marker not found, keeping rest of frame");
                    Ok(image)
                }
            }
        }
        ImageFormat::Png => {
            let start = find(data, &PNG_SIGNATURE)
                .ok_or_else(|| Id3Error::malformed("APIC", "PNG signature not found"))?;
            Ok(&data[start..])
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
