//! Uploader configuration: validation limits, mode, endpoint, and
//! pre-existing files.
//!
//! Every field has a default except the upload URL, so a JSON
//! configuration only needs to name what it overrides.

use serde::{Deserialize, Serialize};

use crate::types::{FileDescriptor, UploadMode};

/// Validation limits applied before an upload.
///
/// `None` means unbounded. An empty `allowed_extensions` list accepts
/// every extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UploadOptions {
    /// Maximum number of files per upload.
    pub max_files: Option<usize>,

    /// Minimum number of files per upload. `0` disables the check.
    pub min_files: usize,

    /// Maximum combined size of all files, in bytes.
    pub max_total_size: Option<u64>,

    /// Maximum size of any single file, in bytes.
    pub max_file_size: Option<u64>,

    /// Accepted extensions without the leading dot (e.g. `"png"`).
    ///
    /// Compared against the lowercased last-dot suffix of each file
    /// name, so entries should be lowercase.
    pub allowed_extensions: Vec<String>,
}

/// Metadata for a file already stored on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingFile {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, rename = "type")]
    pub mime_type: String,
}

impl ExistingFile {
    /// Convert to a metadata-only [`FileDescriptor`] with a fresh id.
    #[must_use]
    pub fn to_descriptor(&self) -> FileDescriptor {
        FileDescriptor::existing(self.name.clone(), self.size, self.mime_type.clone())
    }
}

/// Construction-time configuration for an [`Uploader`](crate::Uploader).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploaderConfig {
    /// Endpoint that receives the multipart `POST`.
    pub upload_url: String,

    #[serde(default)]
    pub upload_mode: UploadMode,

    #[serde(default)]
    pub options: UploadOptions,

    /// Files shown as already uploaded when the widget starts.
    #[serde(default)]
    pub existing_files: Vec<ExistingFile>,
}

impl UploaderConfig {
    /// Configuration with default options, multi mode, and no existing
    /// files.
    pub fn new(upload_url: impl Into<String>) -> Self {
        Self {
            upload_url: upload_url.into(),
            upload_mode: UploadMode::default(),
            options: UploadOptions::default(),
            existing_files: Vec::new(),
        }
    }

    /// Parse and check a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the JSON is malformed or lacks
    /// `uploadUrl`, and the errors of [`check`](Self::check) otherwise.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    /// Check cross-field invariants that the types cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingUploadUrl`] for a blank URL and
    /// [`ConfigError::InvalidOptions`] when `min_files` exceeds
    /// `max_files`.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.upload_url.trim().is_empty() {
            return Err(ConfigError::MissingUploadUrl);
        }
        if let Some(max) = self.options.max_files
            && self.options.min_files > max
        {
            return Err(ConfigError::InvalidOptions(format!(
                "minFiles ({}) exceeds maxFiles ({max})",
                self.options.min_files
            )));
        }
        Ok(())
    }
}

/// Errors from loading an [`UploaderConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration is not valid JSON for this schema.
    #[error("failed to parse uploader configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// `uploadUrl` is empty.
    #[error("uploader configuration has an empty uploadUrl")]
    MissingUploadUrl,

    /// The validation limits contradict each other.
    #[error("invalid upload options: {0}")]
    InvalidOptions(String),
}
