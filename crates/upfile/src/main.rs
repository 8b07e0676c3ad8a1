use dioxus::prelude::*;
use tracing::info;
use upfile_core::{Callbacks, UploadResult, UploadRun, UploaderConfig, UploaderState};
use upfile_io::notify;
use upfile_io::{FileUploader, UploadPreview, use_uploader};

/// Widget configuration bundled with the page.
const CONFIG_JSON: &str = include_str!("../uploader.json");

fn main() {
    dioxus::launch(app);
}

/// Root application component.
///
/// Loads the bundled configuration and shows either the upload page or
/// the configuration error.
fn app() -> Element {
    let config = use_hook(|| UploaderConfig::from_json(CONFIG_JSON).map_err(|e| e.to_string()));

    rsx! {
        main { class: "max-w-2xl mx-auto p-6",
            h1 { class: "text-2xl font-semibold mb-4", "upfile" }
            match config {
                Ok(config) => rsx! { UploadPage { config } },
                Err(e) => rsx! {
                    p { class: "text-[var(--text-error)]", "{e}" }
                },
            }
        }
    }
}

#[derive(Props, Clone, PartialEq)]
struct UploadPageProps {
    config: UploaderConfig,
}

/// One uploader with its preview, an upload button, and the results.
#[component]
fn UploadPage(props: UploadPageProps) -> Element {
    let results = use_signal(Vec::<UploadResult>::new);
    let mut error = use_signal(|| Option::<String>::None);

    let config = props.config.clone();
    let handle = use_uploader(move || {
        let callbacks = Callbacks::new()
            .on_load(|file| info!(file = file.name(), size = file.size(), "file loaded"))
            .before_upload_async(|files| async move {
                notify::confirm(&format!("Upload {} file(s)?", files.len()))
            })
            .after_upload(move |uploaded| {
                let mut results = results;
                results.set(uploaded.to_vec());
            });
        (config, callbacks)
    });

    let files = handle.display_files();
    let uploading = handle.state() == UploaderState::Uploading;

    let upload_handle = handle.clone();
    let on_upload = move |_| {
        let handle = upload_handle.clone();
        spawn(async move {
            match handle.upload().await {
                Ok(UploadRun::Completed(done)) => {
                    info!(count = done.len(), "upload finished");
                    error.set(None);
                }
                Ok(UploadRun::Cancelled | UploadRun::NothingToUpload) => {}
                Err(e) => error.set(Some(e.to_string())),
            }
        });
    };

    let remove_handle = handle.clone();
    let reset_handle = handle.clone();

    rsx! {
        FileUploader { handle: handle.clone(),
            p { class: "text-[var(--text-secondary)]",
                "Drop files here or click to choose"
            }
        }

        UploadPreview {
            files,
            on_remove: move |id| {
                remove_handle.remove_file(id);
            },
        }

        div { class: "flex gap-2 mt-4",
            button {
                class: "px-4 py-2 bg-[var(--btn-primary)] hover:bg-[var(--btn-primary-hover)] rounded text-white font-medium disabled:opacity-50",
                disabled: uploading,
                onclick: on_upload,
                if uploading { "Uploading..." } else { "Upload" }
            }
            button {
                class: "px-4 py-2 rounded border border-[var(--border-muted)]",
                disabled: uploading,
                onclick: move |_| reset_handle.reset_files(),
                "Clear"
            }
        }

        if let Some(ref err) = error() {
            p { class: "text-[var(--text-error)] mt-2", "{err}" }
        }

        if !results.read().is_empty() {
            ul { class: "mt-4 space-y-1 text-sm",
                for result in results.read().iter() {
                    li { key: "{result.file.id()}",
                        match result.error() {
                            None => rsx! { "✓ {result.file.name()}" },
                            Some(err) => rsx! {
                                span { class: "text-[var(--text-error)]",
                                    "✗ {result.file.name()}: {err}"
                                }
                            },
                        }
                    }
                }
            }
        }
    }
}
