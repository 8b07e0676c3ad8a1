//! Preview model for the displayed files.
//!
//! Image files with contents become thumbnails; everything else becomes
//! a text label `name.subtype`. Rendering lives in `upfile-io`.

use crate::types::FileDescriptor;

/// Width of a thumbnail in CSS pixels.
pub const THUMBNAIL_WIDTH_PX: u32 = 100;

/// One element of the preview region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewItem {
    /// Render the image bytes at a bounded width.
    Thumbnail {
        file: FileDescriptor,
        width_px: u32,
    },
    /// Render a text label.
    Label { file: FileDescriptor, text: String },
}

impl PreviewItem {
    #[must_use]
    pub const fn file(&self) -> &FileDescriptor {
        match self {
            Self::Thumbnail { file, .. } | Self::Label { file, .. } => file,
        }
    }
}

/// Build the preview for `files`, in order.
///
/// Metadata-only image files (no bytes to show) fall back to a label.
#[must_use]
pub fn build_preview(files: &[FileDescriptor]) -> Vec<PreviewItem> {
    files
        .iter()
        .map(|file| {
            if file.is_image() && file.contents().is_some() {
                PreviewItem::Thumbnail {
                    file: file.clone(),
                    width_px: THUMBNAIL_WIDTH_PX,
                }
            } else {
                PreviewItem::Label {
                    file: file.clone(),
                    text: label_text(file),
                }
            }
        })
        .collect()
}

/// Label text for a non-image file: the name, a dot, and the MIME
/// subtype. A file with no MIME type is labelled with its name alone.
#[must_use]
pub fn label_text(file: &FileDescriptor) -> String {
    let subtype = file.mime_subtype();
    if subtype.is_empty() {
        file.name().to_owned()
    } else {
        format!("{}.{subtype}", file.name())
    }
}
