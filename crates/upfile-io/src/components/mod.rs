//! Dioxus UI components for upfile.
//!
//! Provides the drop zone with its overlaid file input and the preview
//! region that sits next to it.

mod preview;
mod uploader;

pub use preview::UploadPreview;
pub use uploader::FileUploader;
