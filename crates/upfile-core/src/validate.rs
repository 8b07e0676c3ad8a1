//! Client-side validation of a file selection against [`UploadOptions`].
//!
//! Checks run in a fixed order and stop at the first violation:
//! extension, maximum count, minimum count, total size, per-file size.
//!
//! The `Display` strings are the user-facing (Korean) messages shown by
//! the widget; the variant fields carry the details for callers.

use crate::config::UploadOptions;
use crate::types::FileDescriptor;

/// A selection that violates one of the [`UploadOptions`] limits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A file's extension is not in `allowed_extensions`.
    #[error("허용되지 않은 파일 확장자가 포함되어 있습니다.")]
    InvalidExtension { name: String },

    /// More files than `max_files`.
    #[error("파일 최대 개수를 초과하였습니다.")]
    TooManyFiles { count: usize, max: usize },

    /// Fewer files than `min_files`.
    #[error("파일 최소 개수를 충족하지 않았습니다.")]
    TooFewFiles { count: usize, min: usize },

    /// Combined size above `max_total_size`.
    #[error("파일 총 업로드 가능 크기를 초과하였습니다.")]
    TotalSizeExceeded { total: u64, max: u64 },

    /// One file above `max_file_size`.
    #[error("파일 최대 크기를 초과하였습니다.")]
    FileSizeExceeded { name: String, size: u64, max: u64 },
}

/// Check `files` against `options`.
///
/// Pure: no side effects, reports only the first violation.
///
/// # Errors
///
/// Returns the [`ValidationError`] for the first failing check.
pub fn validate(files: &[FileDescriptor], options: &UploadOptions) -> Result<(), ValidationError> {
    if !options.allowed_extensions.is_empty()
        && let Some(file) = files
            .iter()
            .find(|f| !is_allowed_extension(f, &options.allowed_extensions))
    {
        return Err(ValidationError::InvalidExtension {
            name: file.name().to_owned(),
        });
    }

    let count = files.len();
    if let Some(max) = options.max_files
        && count > max
    {
        return Err(ValidationError::TooManyFiles { count, max });
    }

    if options.min_files > 0 && count < options.min_files {
        return Err(ValidationError::TooFewFiles {
            count,
            min: options.min_files,
        });
    }

    if let Some(max) = options.max_total_size {
        let total = total_size(files);
        if total > max {
            return Err(ValidationError::TotalSizeExceeded { total, max });
        }
    }

    if let Some(max) = options.max_file_size
        && let Some(file) = files.iter().find(|f| f.size() > max)
    {
        return Err(ValidationError::FileSizeExceeded {
            name: file.name().to_owned(),
            size: file.size(),
            max,
        });
    }

    Ok(())
}

/// Sum of all file sizes, saturating at `u64::MAX`.
#[must_use]
pub fn total_size(files: &[FileDescriptor]) -> u64 {
    files.iter().fold(0u64, |acc, f| acc.saturating_add(f.size()))
}

/// Existing files followed by newly selected ones, both preserved.
#[must_use]
pub fn merge_with_existing(
    existing: &[FileDescriptor],
    new_files: &[FileDescriptor],
) -> Vec<FileDescriptor> {
    existing.iter().chain(new_files).cloned().collect()
}

fn is_allowed_extension(file: &FileDescriptor, allowed: &[String]) -> bool {
    let ext = file.extension().to_lowercase();
    allowed.iter().any(|a| *a == ext)
}
