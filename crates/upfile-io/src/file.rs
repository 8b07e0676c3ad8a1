//! Reading picked or dropped files into [`FileDescriptor`]s.

use dioxus::html::FileData;
use upfile_core::FileDescriptor;

/// MIME type used when the browser reports none.
const FALLBACK_MIME: &str = "application/octet-stream";

/// A file could not be read from the browser.
#[derive(Debug, thiserror::Error)]
#[error("Failed to read {name}: {message}")]
pub struct ReadError {
    pub name: String,
    pub message: String,
}

/// Read one browser file's name, type, and bytes.
///
/// # Errors
///
/// Returns [`ReadError`] if the browser fails to deliver the bytes.
#[allow(clippy::future_not_send)] // WASM is single-threaded; FileData is !Send
pub async fn read_file(file: &FileData) -> Result<FileDescriptor, ReadError> {
    let name = file.name();
    let mime_type = file
        .content_type()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| FALLBACK_MIME.to_owned());
    let bytes = file.read_bytes().await.map_err(|e| ReadError {
        name: name.clone(),
        message: e.to_string(),
    })?;
    Ok(FileDescriptor::new(name, mime_type, bytes.to_vec()))
}

/// Read every file in platform order.
///
/// Files that fail to read are skipped and reported separately, so one
/// bad file does not lose the rest of the selection.
#[allow(clippy::future_not_send)] // WASM is single-threaded; FileData is !Send
pub async fn read_files(files: Vec<FileData>) -> (Vec<FileDescriptor>, Vec<ReadError>) {
    let mut read = Vec::with_capacity(files.len());
    let mut failed = Vec::new();
    for file in &files {
        match read_file(file).await {
            Ok(descriptor) => read.push(descriptor),
            Err(e) => failed.push(e),
        }
    }
    (read, failed)
}
