//! Upload client: multipart requests through a pluggable transport.
//!
//! The [`UploadTransport`] trait performs one multipart `POST` and
//! returns the decoded JSON body. The helpers in this module turn
//! transport outcomes into per-file [`UploadResult`]s and never fail:
//! every transport error is captured into the result for the affected
//! file(s).

use std::future::Future;

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{FileDescriptor, UploadMode, UploadResult};

/// Multipart field name used in single mode.
pub const SINGLE_FIELD: &str = "file";

/// Multipart field name (repeated once per file) used in multi mode.
pub const MULTI_FIELD: &str = "files";

/// Why a multipart request did not produce a JSON body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status. The body is not read.
    #[error("upload failed with HTTP status {status}")]
    Http { status: u16 },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The response body was not the expected JSON.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A browser API call needed to build the request failed.
    #[error("browser API error: {0}")]
    Browser(String),
}

/// Sends one multipart `POST` and decodes the JSON response.
///
/// Every file in `files` is appended under the same `field` name, in
/// order.
pub trait UploadTransport {
    /// Post `files` to `url` as multipart form data.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] for network failures, non-2xx
    /// statuses, and bodies that are not valid JSON.
    fn post_multipart(
        &self,
        url: &str,
        field: &str,
        files: &[FileDescriptor],
    ) -> impl Future<Output = Result<Value, TransportError>>;
}

/// Upload one file under the `file` field.
///
/// Failures become an error [`UploadResult`]; this never fails itself.
#[allow(clippy::future_not_send)] // WASM transports are !Send
pub async fn upload_single<T: UploadTransport>(
    transport: &T,
    url: &str,
    file: &FileDescriptor,
) -> UploadResult {
    match transport
        .post_multipart(url, SINGLE_FIELD, std::slice::from_ref(file))
        .await
    {
        Ok(result) => UploadResult::success(file.clone(), result),
        Err(e) => {
            warn!(file = file.name(), error = %e, "upload failed");
            UploadResult::failure(file.clone(), e.to_string())
        }
    }
}

/// Upload all `files` in one request under the repeated `files` field.
///
/// A JSON array response is matched to the inputs by position. Files
/// without a matching entry get an error result; surplus entries are
/// ignored. Any other response, or a transport failure, yields one error
/// result per input file.
#[allow(clippy::future_not_send)] // WASM transports are !Send
pub async fn upload_multiple<T: UploadTransport>(
    transport: &T,
    url: &str,
    files: &[FileDescriptor],
) -> Vec<UploadResult> {
    let response = transport.post_multipart(url, MULTI_FIELD, files).await;
    match response {
        Ok(Value::Array(entries)) => zip_results(files, entries),
        Ok(other) => {
            let e = TransportError::InvalidResponse(format!(
                "expected a JSON array, got {}",
                json_kind(&other)
            ));
            warn!(files = files.len(), error = %e, "multi upload failed");
            fail_all(files, &e)
        }
        Err(e) => {
            warn!(files = files.len(), error = %e, "multi upload failed");
            fail_all(files, &e)
        }
    }
}

/// Upload `files` according to `mode`.
///
/// Single mode issues one request per file concurrently; the results
/// keep the input order regardless of completion order. An empty input
/// sends nothing.
#[allow(clippy::future_not_send)] // WASM transports are !Send
pub async fn upload_all<T: UploadTransport>(
    transport: &T,
    url: &str,
    files: &[FileDescriptor],
    mode: UploadMode,
) -> Vec<UploadResult> {
    if files.is_empty() {
        return Vec::new();
    }
    debug!(files = files.len(), %mode, url, "starting upload");
    match mode {
        UploadMode::Multi => upload_multiple(transport, url, files).await,
        UploadMode::Single => {
            join_all(files.iter().map(|f| upload_single(transport, url, f))).await
        }
    }
}

fn zip_results(files: &[FileDescriptor], entries: Vec<Value>) -> Vec<UploadResult> {
    if entries.len() > files.len() {
        debug!(
            extra = entries.len() - files.len(),
            "ignoring surplus entries in multi upload response"
        );
    }
    let mut entries = entries.into_iter();
    files
        .iter()
        .map(|file| match entries.next() {
            Some(result) => UploadResult::success(file.clone(), result),
            None => {
                warn!(file = file.name(), "multi upload response has no entry for file");
                UploadResult::failure(
                    file.clone(),
                    TransportError::InvalidResponse("no result returned for this file".into())
                        .to_string(),
                )
            }
        })
        .collect()
}

fn fail_all(files: &[FileDescriptor], error: &TransportError) -> Vec<UploadResult> {
    let message = error.to_string();
    files
        .iter()
        .map(|f| UploadResult::failure(f.clone(), message.clone()))
        .collect()
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
