//! Preview region for the displayed files.

use dioxus::prelude::*;
use upfile_core::preview::{PreviewItem, build_preview};
use upfile_core::{FileDescriptor, FileId};

use crate::blob;

/// Props for the [`UploadPreview`] component.
#[derive(Props, Clone, PartialEq)]
pub struct UploadPreviewProps {
    /// Files to show, in display order.
    files: Vec<FileDescriptor>,
    /// Called with a file's id when its remove button is pressed.
    /// Without a handler no remove buttons are shown.
    #[props(default)]
    on_remove: Option<EventHandler<FileId>>,
}

/// One rendered preview entry and its object URL, if it has one.
type PreviewEntry = (FileId, PreviewItem, Option<String>);

/// Entries built for one file list, keyed by the files' ids.
#[derive(Clone)]
struct PreviewCache {
    ids: Vec<FileId>,
    entries: Vec<PreviewEntry>,
}

impl PreviewCache {
    fn revoke(&self) {
        for url in self.entries.iter().filter_map(|(_, _, url)| url.as_deref()) {
            blob::revoke_blob_url(url);
        }
    }
}

/// Thumbnails for images, `name.subtype` labels for everything else.
///
/// The region is rebuilt only when the file list changes. Object URLs
/// from the previous build are revoked first, and the last set is
/// revoked on unmount.
#[component]
pub fn UploadPreview(props: UploadPreviewProps) -> Element {
    let mut cache: Signal<Option<PreviewCache>> = use_signal(|| None);

    {
        let cache = cache;
        use_drop(move || {
            if let Some(ref cached) = *cache.peek() {
                cached.revoke();
            }
        });
    }

    let ids = file_ids(&props.files);
    let stale = cache.peek().as_ref().is_none_or(|c| c.ids != ids);
    if stale {
        if let Some(ref old) = cache.take() {
            old.revoke();
        }
        cache.set(Some(PreviewCache {
            ids,
            entries: build_entries(&props.files),
        }));
    }

    let entries = cache
        .peek()
        .as_ref()
        .map(|c| c.entries.clone())
        .unwrap_or_default();

    let on_remove = props.on_remove;

    rsx! {
        div { class: "flex flex-wrap gap-3 mt-4",
            for (id, item, url) in entries {
                div {
                    key: "{id}",
                    class: "relative flex flex-col items-center text-sm text-[var(--text-secondary)]",
                    match (&item, url) {
                        (PreviewItem::Thumbnail { file, width_px }, Some(url)) => rsx! {
                            img {
                                src: "{url}",
                                width: "{width_px}",
                                alt: "{file.name()}",
                                class: "rounded",
                            }
                        },
                        (item, _) => rsx! {
                            span { class: "px-2 py-1 rounded bg-[var(--surface)]",
                                "{label_for(item)}"
                            }
                        },
                    }
                    if let Some(on_remove) = on_remove {
                        button {
                            class: "text-xs text-[var(--muted)] hover:text-[var(--text-error)]",
                            title: "Remove",
                            onclick: move |_| on_remove.call(id),
                            "×"
                        }
                    }
                }
            }
        }
    }
}

fn file_ids(files: &[FileDescriptor]) -> Vec<FileId> {
    files.iter().map(FileDescriptor::id).collect()
}

/// Preview items for `files`, with object URLs for the thumbnails.
fn build_entries(files: &[FileDescriptor]) -> Vec<PreviewEntry> {
    build_preview(files)
        .into_iter()
        .map(|item| {
            let url = match &item {
                PreviewItem::Thumbnail { file, .. } => match blob::file_to_blob_url(file) {
                    Ok(url) => Some(url),
                    Err(e) => {
                        tracing::warn!(file = file.name(), error = %e, "thumbnail unavailable");
                        None
                    }
                },
                PreviewItem::Label { .. } => None,
            };
            (item.file().id(), item, url)
        })
        .collect()
}

/// Label text, also used when a thumbnail could not be created.
fn label_for(item: &PreviewItem) -> String {
    match item {
        PreviewItem::Label { text, .. } => text.clone(),
        PreviewItem::Thumbnail { file, .. } => upfile_core::preview::label_text(file),
    }
}
