//! upfile-io: Browser I/O and Dioxus component library.
//!
//! Sends multipart uploads with `fetch`, reads picked files into
//! [`upfile_core::FileDescriptor`]s, manages Blob URLs for thumbnails,
//! and provides the uploader and preview components.

pub mod blob;
pub mod components;
pub mod fetch;
pub mod file;
pub mod hook;
pub mod notify;

pub use components::{FileUploader, UploadPreview};
pub use fetch::FetchTransport;
pub use hook::{BrowserUploader, UploaderHandle, use_uploader};
