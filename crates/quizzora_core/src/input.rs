use std::fmt;

use bytes::Bytes;

/// Largest file accepted for upload (100 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

const PDF_MIME: &str = "application/pdf";
const PDF_EXTENSION: &str = "pdf";
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "m4a", "aac", "flac", "ogg", "oga", "opus", "wma",
];
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "webm", "m4v", "wmv", "flv", "mpeg", "mpg",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInput {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub bytes: Bytes,
}

impl FileInput {
    /// Builds a file input whose size is taken from the payload.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes: bytes.len() as u64,
            bytes,
        }
    }

    /// Builds a file input that carries only its size, for files too large
    /// to be worth reading.
    pub fn unread(name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
            bytes: Bytes::new(),
        }
    }
}

/// The single source submitted in one attempt. A link and a file are never
/// both active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadInput {
    Link { url: String },
    File(FileInput),
}

impl UploadInput {
    pub fn link(url: impl Into<String>) -> Self {
        UploadInput::Link { url: url.into() }
    }

    /// Human-readable origin shown next to the summary.
    pub fn source_label(&self) -> String {
        match self {
            UploadInput::Link { url } => url.trim().to_string(),
            UploadInput::File(file) => file.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    TooLarge,
    UnsupportedType,
    NoInputProvided,
}

impl RejectReason {
    pub fn message(self) -> &'static str {
        match self {
            RejectReason::TooLarge => "File size too large. Maximum size is 100MB.",
            RejectReason::UnsupportedType => {
                "Invalid file type. Please upload a PDF, audio, or video file."
            }
            RejectReason::NoInputProvided => "Please provide a YouTube URL or upload a file.",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

pub type ValidationResult = Result<(), RejectReason>;

/// Checks a candidate input before any network use.
///
/// Links are only checked for being non-blank; URL validity is left to the
/// backend. Files are checked for size first, then for a PDF/audio/video
/// signal in either the declared MIME type or the file name suffix.
pub fn validate(input: &UploadInput) -> ValidationResult {
    match input {
        UploadInput::Link { url } => {
            if url.trim().is_empty() {
                Err(RejectReason::NoInputProvided)
            } else {
                Ok(())
            }
        }
        UploadInput::File(file) => {
            if file.size_bytes > MAX_UPLOAD_BYTES {
                return Err(RejectReason::TooLarge);
            }
            if mime_is_supported(&file.mime_type) || extension_is_supported(&file.name) {
                Ok(())
            } else {
                Err(RejectReason::UnsupportedType)
            }
        }
    }
}

/// Validates whatever is selected at submission time.
pub fn validate_selection(selection: Option<&UploadInput>) -> ValidationResult {
    match selection {
        Some(input) => validate(input),
        None => Err(RejectReason::NoInputProvided),
    }
}

fn mime_is_supported(mime_type: &str) -> bool {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == PDF_MIME || essence.starts_with("audio/") || essence.starts_with("video/")
}

fn extension_is_supported(name: &str) -> bool {
    let Some((_, ext)) = name.trim().rsplit_once('.') else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    ext == PDF_EXTENSION
        || AUDIO_EXTENSIONS.contains(&ext.as_str())
        || VIDEO_EXTENSIONS.contains(&ext.as_str())
}
