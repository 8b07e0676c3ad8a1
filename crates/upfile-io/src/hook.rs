//! Dioxus hook owning one uploader per component instance.

use std::rc::Rc;

use dioxus::prelude::*;
use upfile_core::{
    Callbacks, FileDescriptor, FileId, UploadError, UploadResult, UploadRun, Uploader,
    UploaderConfig, UploaderState,
};

use crate::fetch::FetchTransport;
use crate::notify;

/// An uploader that sends with the browser `fetch` API.
pub type BrowserUploader = Uploader<FetchTransport>;

/// Shared access to a component's uploader.
///
/// Cloning is cheap. Reading [`display_files`](Self::display_files)
/// inside a component subscribes it to display changes.
#[derive(Clone)]
pub struct UploaderHandle {
    uploader: Rc<BrowserUploader>,
    revision: Signal<u64>,
}

impl PartialEq for UploaderHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.uploader, &other.uploader)
    }
}

impl UploaderHandle {
    /// The underlying uploader.
    #[must_use]
    pub fn uploader(&self) -> &BrowserUploader {
        &self.uploader
    }

    /// Stage newly read files. See [`Uploader::capture`].
    pub fn capture(&self, files: Vec<FileDescriptor>) {
        self.uploader.capture(files);
    }

    /// Currently displayed files, subscribing the caller to changes.
    #[must_use]
    pub fn display_files(&self) -> Vec<FileDescriptor> {
        let _ = self.revision.read();
        self.uploader.display_files()
    }

    /// Upload results so far, subscribing the caller to changes.
    #[must_use]
    pub fn uploaded_files(&self) -> Vec<UploadResult> {
        let _ = self.revision.read();
        self.uploader.uploaded_files()
    }

    /// Lifecycle state, subscribing the caller to changes.
    #[must_use]
    pub fn state(&self) -> UploaderState {
        let _ = self.revision.read();
        self.uploader.state()
    }

    /// Remove one displayed file. See [`Uploader::remove_file`].
    pub fn remove_file(&self, id: FileId) -> bool {
        self.uploader.remove_file(id)
    }

    /// Clear the selection. See [`Uploader::reset_files`].
    pub fn reset_files(&self) {
        self.uploader.reset_files();
    }

    /// Run an upload, alerting the user when nothing is selected.
    ///
    /// # Errors
    ///
    /// Same as [`Uploader::upload`].
    #[allow(clippy::future_not_send)] // WASM is single-threaded; Rc state is !Send
    pub async fn upload(&self) -> Result<UploadRun, UploadError> {
        self.bump();
        let run = self.uploader.upload().await;
        if matches!(run, Ok(UploadRun::NothingToUpload)) {
            notify::alert(notify::EMPTY_SELECTION_MESSAGE);
        }
        // State changes without a display change (cancel, validation
        // failure) still need a re-render.
        self.bump();
        run
    }

    fn bump(&self) {
        let mut revision = self.revision;
        revision += 1;
    }
}

/// Create an uploader for the calling component.
///
/// `init` runs once, on first render. Existing files from the config
/// are loaded immediately and the display re-renders whenever the
/// selection changes.
pub fn use_uploader(init: impl FnOnce() -> (UploaderConfig, Callbacks)) -> UploaderHandle {
    let revision = use_signal(|| 0_u64);
    let uploader = use_hook(move || {
        let (config, callbacks) = init();
        let uploader = Rc::new(Uploader::new(config, callbacks, FetchTransport));
        uploader.subscribe(Rc::new(move |_: &[FileDescriptor]| {
            let mut revision = revision;
            revision += 1;
        }));
        uploader
    });
    UploaderHandle { uploader, revision }
}
