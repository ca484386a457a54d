//! Turning uploaded documents into plain text.

use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::TARGET_INGEST;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("text extraction failed for {filename}: {reason}")]
    ExtractionFailed { filename: String, reason: String },
}

/// Document formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Txt,
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 3] = [Self::Txt, Self::Pdf, Self::Docx];

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }

    /// Format named by the last extension of `filename`, ignoring case.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, extension) = filename.rsplit_once('.')?;
        let extension = extension.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.extension() == extension)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

pub fn allowed_file(filename: &str) -> bool {
    DocumentFormat::from_filename(filename).is_some()
}

/// A file blob as received from an upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    pub fn read(path: &Path) -> std::io::Result<Self> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(filename, std::fs::read(path)?))
    }
}

/// Text extraction service: file blob in, raw text out.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, file: &UploadedFile) -> Result<String, IngestError>;
}

/// Extracts `.txt` uploads. PDF and DOCX need an external extraction service
/// and are reported as unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, file: &UploadedFile) -> Result<String, IngestError> {
        match DocumentFormat::from_filename(&file.filename) {
            Some(DocumentFormat::Txt) => String::from_utf8(file.bytes.clone()).map_err(|e| {
                IngestError::ExtractionFailed {
                    filename: file.filename.clone(),
                    reason: e.to_string(),
                }
            }),
            Some(format) => Err(IngestError::UnsupportedFormat(format!(
                "{} files need an external extractor",
                format
            ))),
            None => Err(IngestError::UnsupportedFormat(file.filename.clone())),
        }
    }
}

/// Concatenate the text of every allowed file, in upload order.
///
/// Files whose extension is not allowed are skipped; extraction errors of
/// allowed files are returned.
pub fn parse_uploaded_files(
    extractor: &dyn TextExtractor,
    files: &[UploadedFile],
) -> Result<String, IngestError> {
    let mut content = String::new();
    for file in files {
        if !allowed_file(&file.filename) {
            warn!(target: TARGET_INGEST, "Skipping upload with disallowed extension: {}", file.filename);
            continue;
        }
        let text = extractor.extract_text(file)?;
        debug!(target: TARGET_INGEST, "Extracted {} bytes of text from {}", text.len(), file.filename);
        content.push_str(&text);
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("notes.TXT"));
        assert!(allowed_file("archive.tar.pdf"));
        assert!(allowed_file("report.docx"));
        assert!(!allowed_file("image.png"));
        assert!(!allowed_file("txt"));
        assert_eq!(DocumentFormat::from_filename("a.Docx"), Some(DocumentFormat::Docx));
    }

    #[test]
    fn test_plain_text_extraction() {
        let extractor = PlainTextExtractor;
        let text = extractor
            .extract_text(&UploadedFile::new("a.txt", "The cell."))
            .unwrap();
        assert_eq!(text, "The cell.");

        assert!(matches!(
            extractor.extract_text(&UploadedFile::new("a.pdf", vec![0x25u8, 0x50])),
            Err(IngestError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            extractor.extract_text(&UploadedFile::new("a.txt", vec![0xffu8, 0xfe])),
            Err(IngestError::ExtractionFailed { .. })
        ));
    }

    #[test]
    fn test_parse_uploaded_files_concatenates_and_skips() {
        let files = vec![
            UploadedFile::new("one.txt", "Mitochondria produce energy. "),
            UploadedFile::new("photo.jpg", vec![0xffu8, 0xd8]),
            UploadedFile::new("two.TXT", "The cell divides."),
        ];
        let content = parse_uploaded_files(&PlainTextExtractor, &files).unwrap();
        assert_eq!(content, "Mitochondria produce energy. The cell divides.");
    }

    #[test]
    fn test_parse_uploaded_files_propagates_extraction_errors() {
        let files = vec![UploadedFile::new("scan.pdf", vec![0x25u8])];
        assert!(parse_uploaded_files(&PlainTextExtractor, &files).is_err());
    }

    #[test]
    fn test_read_uploaded_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"cell wall").unwrap();

        let upload = UploadedFile::read(&path).unwrap();
        assert_eq!(upload.filename, "answers.txt");
        assert_eq!(
            parse_uploaded_files(&PlainTextExtractor, &[upload]).unwrap(),
            "cell wall"
        );
    }
}
