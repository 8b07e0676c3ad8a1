//! Shared types for upfile: file descriptors, upload modes and results.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Process-unique identity of a [`FileDescriptor`].
///
/// Two descriptors are the same file exactly when their ids match, even
/// if name, size, and type coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FileId(u64);

impl FileId {
    /// Allocate a fresh id.
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One user file.
///
/// Files captured from the picker or a drop carry their bytes.
/// Pre-existing files (already stored on the server) carry metadata only.
///
/// Cloning is cheap: the contents are reference counted. Equality is
/// identity equality on [`FileId`].
#[derive(Debug, Clone, Serialize)]
pub struct FileDescriptor {
    id: FileId,
    name: String,
    size: u64,
    #[serde(rename = "type")]
    mime_type: String,
    #[serde(skip)]
    contents: Option<Rc<[u8]>>,
}

impl FileDescriptor {
    /// Create a descriptor for a freshly selected file.
    ///
    /// The size is taken from the length of `contents`.
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        contents: impl Into<Rc<[u8]>>,
    ) -> Self {
        let contents = contents.into();
        Self {
            id: FileId::next(),
            name: name.into(),
            size: contents.len() as u64,
            mime_type: mime_type.into(),
            contents: Some(contents),
        }
    }

    /// Create a metadata-only descriptor for a file that already exists
    /// on the server.
    pub fn existing(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            id: FileId::next(),
            name: name.into(),
            size,
            mime_type: mime_type.into(),
            contents: None,
        }
    }

    #[must_use]
    pub const fn id(&self) -> FileId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// MIME type as reported by the platform (may be empty).
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The file bytes, or `None` for a metadata-only descriptor.
    #[must_use]
    pub fn contents(&self) -> Option<&[u8]> {
        self.contents.as_deref()
    }

    /// Text after the last `.` in the name.
    ///
    /// A name without a dot yields the whole name.
    #[must_use]
    pub fn extension(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map_or(self.name.as_str(), |(_, ext)| ext)
    }

    /// The part of the MIME type after `/`, or the whole type if it has
    /// no slash.
    #[must_use]
    pub fn mime_subtype(&self) -> &str {
        self.mime_type
            .split_once('/')
            .map_or(self.mime_type.as_str(), |(_, sub)| sub)
    }

    /// Whether the MIME type is `image/*`.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

impl PartialEq for FileDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FileDescriptor {}

/// How captured files are sent to the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// One request per file, issued concurrently.
    Single,
    /// All files in one request.
    #[default]
    Multi,
}

impl fmt::Display for UploadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Single => "single",
            Self::Multi => "multi",
        })
    }
}

/// Coarse status of one [`UploadResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadStatus {
    Success,
    Error,
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Error => "error",
        })
    }
}

/// What the server (or the transport) said about one file.
///
/// Serialized with a `status` tag so the JSON shape is
/// `{"status": "success", "result": ...}` or
/// `{"status": "error", "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadOutcome {
    /// The server accepted the file and returned this JSON value.
    Success { result: serde_json::Value },
    /// The upload failed; the message describes why.
    Error { error: String },
}

/// Per-file upload result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadResult {
    /// The file this result belongs to.
    pub file: FileDescriptor,
    /// Server response or failure.
    #[serde(flatten)]
    pub outcome: UploadOutcome,
}

impl UploadResult {
    /// A successful result carrying the server's JSON response.
    #[must_use]
    pub const fn success(file: FileDescriptor, result: serde_json::Value) -> Self {
        Self {
            file,
            outcome: UploadOutcome::Success { result },
        }
    }

    /// A failed result carrying a human-readable reason.
    pub fn failure(file: FileDescriptor, error: impl Into<String>) -> Self {
        Self {
            file,
            outcome: UploadOutcome::Error {
                error: error.into(),
            },
        }
    }

    #[must_use]
    pub const fn status(&self) -> UploadStatus {
        match self.outcome {
            UploadOutcome::Success { .. } => UploadStatus::Success,
            UploadOutcome::Error { .. } => UploadStatus::Error,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, UploadOutcome::Success { .. })
    }

    /// The server's JSON response, if the upload succeeded.
    #[must_use]
    pub const fn result(&self) -> Option<&serde_json::Value> {
        match &self.outcome {
            UploadOutcome::Success { result } => Some(result),
            UploadOutcome::Error { .. } => None,
        }
    }

    /// The failure reason, if the upload failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            UploadOutcome::Success { .. } => None,
            UploadOutcome::Error { error } => Some(error),
        }
    }
}
