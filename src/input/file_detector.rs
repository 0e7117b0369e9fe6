//! File type detection by content sniffing

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

/// Maximum number of leading bytes inspected when classifying a document.
pub const SNIFF_LEN: usize = 1024;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_PPTX: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_PPT: &str = "application/vnd.ms-powerpoint";
pub const MIME_ZIP: &str = "application/zip";
pub const MIME_OLE: &str = "application/x-ole-storage";
pub const MIME_PNG: &str = "image/png";
pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_GIF: &str = "image/gif";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_OCTET: &str = "application/octet-stream";

const ZIP_LOCAL_HEADER: &[u8] = b"PK\x03\x04";
const ZIP_LOCAL_HEADER_LEN: usize = 30;
const OLE_SIGNATURE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    Pdf,
    Word,
    PowerPoint,
    Unsupported,
}

impl DocumentType {
    /// Classify a sniffed MIME signature.
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.to_lowercase();
        if mime.contains("pdf") {
            DocumentType::Pdf
        } else if mime.contains("word") || mime.contains("officedocument.wordprocessingml.document") {
            DocumentType::Word
        } else if mime.contains("presentation")
            || mime.contains("officedocument.presentationml.presentation")
            || mime.contains("powerpoint")
        {
            DocumentType::PowerPoint
        } else {
            DocumentType::Unsupported
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentType::Pdf => "PDF",
            DocumentType::Word => "Word",
            DocumentType::PowerPoint => "PowerPoint",
            DocumentType::Unsupported => "Unsupported",
        };
        f.write_str(name)
    }
}

/// Sniffs document types from a bounded byte prefix.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileTypeDetector;

impl FileTypeDetector {
    pub fn new() -> Self {
        Self
    }

    /// Classify a buffer. Only the first [`SNIFF_LEN`] bytes are inspected.
    pub fn detect(&self, data: &[u8]) -> DocumentType {
        let prefix = &data[..data.len().min(SNIFF_LEN)];
        let mime = sniff_mime(prefix);
        log::debug!("Sniffed MIME type: {}", mime);
        DocumentType::from_mime(mime)
    }

    /// Classify the next bytes of a reader, restoring its position afterwards
    /// so the same reader can be handed to an extractor.
    pub fn detect_reader<R: Read + Seek>(&self, reader: &mut R) -> io::Result<DocumentType> {
        let start = reader.stream_position()?;

        let mut prefix = Vec::with_capacity(SNIFF_LEN);
        reader.by_ref().take(SNIFF_LEN as u64).read_to_end(&mut prefix)?;

        reader.seek(SeekFrom::Start(start))?;
        Ok(self.detect(&prefix))
    }
}

/// Produce a MIME signature for a byte prefix.
pub fn sniff_mime(prefix: &[u8]) -> &'static str {
    if prefix.starts_with(b"%PDF-") {
        return MIME_PDF;
    }
    if prefix.starts_with(ZIP_LOCAL_HEADER) {
        return sniff_zip(prefix);
    }
    if prefix.starts_with(OLE_SIGNATURE) {
        return sniff_ole(prefix);
    }
    if prefix.starts_with(b"\x89PNG\r\n\x1a\n") {
        return MIME_PNG;
    }
    if prefix.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return MIME_JPEG;
    }
    if prefix.starts_with(b"GIF87a") || prefix.starts_with(b"GIF89a") {
        return MIME_GIF;
    }
    if looks_like_text(prefix) {
        return MIME_TEXT;
    }
    MIME_OCTET
}

/// Walk the ZIP local file headers that fit inside the prefix and look for the
/// part directories that identify OOXML packages.
fn sniff_zip(prefix: &[u8]) -> &'static str {
    let mut offset = 0;

    while offset + ZIP_LOCAL_HEADER_LEN <= prefix.len()
        && &prefix[offset..offset + 4] == ZIP_LOCAL_HEADER
    {
        let flags = read_u16(prefix, offset + 6);
        let compressed_size = read_u32(prefix, offset + 18) as usize;
        let name_len = read_u16(prefix, offset + 26) as usize;
        let extra_len = read_u16(prefix, offset + 28) as usize;

        let name_start = offset + ZIP_LOCAL_HEADER_LEN;
        let name_end = (name_start + name_len).min(prefix.len());
        let name = &prefix[name_start..name_end];

        if name.starts_with(b"word/") {
            return MIME_DOCX;
        }
        if name.starts_with(b"ppt/") {
            return MIME_PPTX;
        }

        // Sizes live in a trailing data descriptor when bit 3 is set
        if flags & 0x0008 != 0 {
            break;
        }
        offset = name_start + name_len + extra_len + compressed_size;
    }

    MIME_ZIP
}

fn sniff_ole(prefix: &[u8]) -> &'static str {
    if contains_utf16(prefix, "WordDocument") {
        MIME_DOC
    } else if contains_utf16(prefix, "PowerPoint Document") {
        MIME_PPT
    } else {
        MIME_OLE
    }
}

fn contains_utf16(haystack: &[u8], needle: &str) -> bool {
    let encoded: Vec<u8> = needle.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
    haystack.windows(encoded.len()).any(|w| w == encoded.as_slice())
}

fn looks_like_text(prefix: &[u8]) -> bool {
    if prefix.is_empty() {
        return false;
    }
    // A multi-byte character may be cut at the prefix boundary
    let valid = match std::str::from_utf8(prefix) {
        Ok(s) => s,
        Err(e) if e.error_len().is_none() => match std::str::from_utf8(&prefix[..e.valid_up_to()]) {
            Ok(s) => s,
            Err(_) => return false,
        },
        Err(_) => return false,
    };
    valid
        .chars()
        .all(|c| !c.is_control() || c == '\n' || c == '\r' || c == '\t' || c == '\x0c')
}

fn read_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn read_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}
