//! upfile-core: Upload widget logic (sans-IO).
//!
//! Captures file selections, validates them against [`UploadOptions`],
//! tracks them in a per-instance [`FileStore`], and uploads them through
//! an [`UploadTransport`]:
//! capture -> validate -> `before_upload` -> upload -> `after_upload`.
//!
//! This crate has **no browser dependencies** -- it operates on in-memory
//! file descriptors and delegates the HTTP request to the transport.
//! All browser interaction (fetch, file reading, rendering) lives in
//! `upfile-io`.

pub mod client;
pub mod config;
pub mod preview;
pub mod store;
pub mod types;
pub mod uploader;
pub mod validate;

pub use client::{TransportError, UploadTransport};
pub use config::{ConfigError, ExistingFile, UploadOptions, UploaderConfig};
pub use preview::PreviewItem;
pub use store::{Bucket, FileStore, StoreEntry, StoreError};
pub use types::{FileDescriptor, FileId, UploadMode, UploadOutcome, UploadResult, UploadStatus};
pub use uploader::{Callbacks, DisplayObserver, UploadError, UploadRun, Uploader, UploaderState};
pub use validate::{ValidationError, validate};
