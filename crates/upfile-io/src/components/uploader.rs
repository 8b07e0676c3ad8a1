//! Drop zone with a transparent file input laid over it.

use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdUpload;

use crate::file;
use crate::hook::UploaderHandle;

/// Covers the whole target so any click opens the picker.
const OVERLAY_STYLE: &str = "position: absolute; top: 0; left: 0; width: 100%; height: 100%; \
                             opacity: 0; cursor: pointer; z-index: 1000;";

/// Props for the [`FileUploader`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileUploaderProps {
    /// Uploader that receives the selected files.
    handle: UploaderHandle,
    /// Visible content of the target area.
    children: Element,
}

/// Turns its content into a click-to-pick and drop target.
///
/// Picked or dropped files are read and appended to the uploader's
/// selection. The picker always allows several files, in both upload
/// modes; count limits are left to validation. It offers only the
/// allowed extensions when any are configured.
#[component]
pub fn FileUploader(props: FileUploaderProps) -> Element {
    let mut dragging = use_signal(|| false);
    let error = use_signal(|| Option::<String>::None);

    let handle = props.handle.clone();
    let handle_files = move |evt: FormEvent| {
        let handle = handle.clone();
        async move {
            capture_files(&handle, evt.files(), error).await;
        }
    };

    let handle = props.handle.clone();
    let handle_drop = move |evt: DragEvent| {
        evt.prevent_default();
        dragging.set(false);
        let handle = handle.clone();
        async move {
            capture_files(&handle, evt.files(), error).await;
        }
    };

    let uploader = props.handle.uploader();
    let accept = accept_attribute(&uploader.options().allowed_extensions);
    let count = props.handle.display_files().len();

    let border_class = if dragging() {
        "border-[var(--border-accent)] bg-[var(--surface-active)]"
    } else {
        "border-[var(--border-muted)] bg-[var(--surface)]"
    };

    rsx! {
        div {
            class: "relative border-2 border-dashed rounded-lg p-6 text-center transition-colors {border_class}",
            ondragover: move |evt| {
                evt.prevent_default();
                dragging.set(true);
            },
            ondragleave: move |_| {
                dragging.set(false);
            },
            ondrop: handle_drop,

            input {
                r#type: "file",
                multiple: true,
                accept: "{accept}",
                style: OVERLAY_STYLE,
                onchange: handle_files,
            }

            div { class: "flex justify-center mb-2 text-[var(--text-secondary)]",
                Icon { width: 24, height: 24, icon: LdUpload }
            }

            {props.children}

            if let Some(ref err) = error() {
                p { class: "text-[var(--text-error)] mt-2",
                    "{err}"
                }
            }

            if count > 0 {
                p { class: "text-[var(--muted)] text-sm mt-2",
                    "{count} selected"
                }
            }
        }
    }
}

/// Read the files and hand them to the uploader.
///
/// Read failures are shown, but the files that did read are still
/// captured.
#[allow(clippy::future_not_send)] // WASM is single-threaded; FileData is !Send
async fn capture_files(
    handle: &UploaderHandle,
    files: Vec<FileData>,
    mut error: Signal<Option<String>>,
) {
    if files.is_empty() {
        return;
    }
    let (read, failed) = file::read_files(files).await;
    for e in &failed {
        tracing::warn!(file = %e.name, error = %e.message, "could not read file");
    }
    error.set(failed.first().map(ToString::to_string));
    handle.capture(read);
}

/// `accept` attribute for the picker: `.ext` entries joined by commas,
/// or empty to accept anything.
fn accept_attribute(allowed_extensions: &[String]) -> String {
    allowed_extensions
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(",")
}
