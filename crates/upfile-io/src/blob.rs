//! Blob and object URL helpers for file contents.
//!
//! The same Blob construction backs both multipart uploads (appended to
//! `FormData`) and thumbnail previews (turned into an object URL).

use upfile_core::FileDescriptor;
use wasm_bindgen::JsValue;
use web_sys::BlobPropertyBag;

/// Errors that can occur when turning a file into a Blob.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// The descriptor has no bytes (a pre-existing server file).
    #[error("file {0} has no contents in the browser")]
    MissingContents(String),

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for BlobError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Create a `Blob` holding the file's bytes, typed with its MIME type.
///
/// # Errors
///
/// Returns [`BlobError::MissingContents`] for metadata-only files and
/// [`BlobError::JsError`] if Blob creation fails.
pub fn file_to_blob(file: &FileDescriptor) -> Result<web_sys::Blob, BlobError> {
    let bytes = file
        .contents()
        .ok_or_else(|| BlobError::MissingContents(file.name().to_owned()))?;

    let uint8_array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::new();
    parts.push(&uint8_array);

    let opts = BlobPropertyBag::new();
    if !file.mime_type().is_empty() {
        opts.set_type(file.mime_type());
    }
    Ok(web_sys::Blob::new_with_u8_array_sequence_and_options(
        &parts, &opts,
    )?)
}

/// Create an object URL for the file's bytes, for use as `<img src>`.
///
/// The returned URL must be revoked via [`revoke_blob_url`] when no
/// longer needed.
///
/// # Errors
///
/// Same as [`file_to_blob`], plus [`BlobError::JsError`] if
/// `URL.createObjectURL` fails.
pub fn file_to_blob_url(file: &FileDescriptor) -> Result<String, BlobError> {
    let blob = file_to_blob(file)?;
    Ok(web_sys::Url::create_object_url_with_blob(&blob)?)
}

/// Revoke an object URL created by [`file_to_blob_url`].
///
/// Failures are ignored; the URL is simply leaked until page unload.
pub fn revoke_blob_url(url: &str) {
    let _ = web_sys::Url::revoke_object_url(url);
}
