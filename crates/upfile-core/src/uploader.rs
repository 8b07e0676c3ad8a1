//! The uploader state machine.
//!
//! An [`Uploader`] owns its [`FileStore`], its options, and a transport.
//! All methods take `&self`; state lives behind `Cell`/`RefCell` and no
//! borrow is held across an `.await`, so event handlers may call back
//! into the uploader while an upload is in flight.
//!
//! ```text
//! Idle --capture--> FilesStaged --upload()--> Uploading --done--> Idle
//!                        ^                        |
//!                        +---- invalid/cancel ----+
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use tracing::{debug, info, warn};

use crate::client::{self, UploadTransport};
use crate::config::{UploadOptions, UploaderConfig};
use crate::store::{Bucket, FileStore};
use crate::types::{FileDescriptor, FileId, UploadMode, UploadResult};
use crate::validate::{ValidationError, validate};

/// Lifecycle state of an [`Uploader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploaderState {
    /// No files staged.
    Idle,
    /// One or more files displayed, not uploading.
    FilesStaged,
    /// Network call(s) in flight.
    Uploading,
}

/// How an [`Uploader::upload`] call ended, when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadRun {
    /// No files were selected; nothing happened.
    NothingToUpload,
    /// `before_upload` returned `false`; nothing was sent.
    Cancelled,
    /// The upload ran. Per-file failures are inside the results.
    Completed(Vec<UploadResult>),
}

/// Errors from [`Uploader::upload`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    /// The selection violates the configured limits.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another upload on this uploader has not finished yet.
    #[error("an upload is already in progress")]
    InProgress,
}

type LoadHook = Rc<dyn Fn(&FileDescriptor)>;
type BeforeHook = Rc<dyn Fn(Vec<FileDescriptor>) -> LocalBoxFuture<'static, bool>>;
type AfterHook = Rc<dyn Fn(&[UploadResult])>;

/// Optional lifecycle hooks.
///
/// Built with the chaining setters:
///
/// ```
/// use upfile_core::Callbacks;
///
/// let callbacks = Callbacks::new()
///     .on_load(|file| println!("loaded {}", file.name()))
///     .before_upload(|files| files.len() < 10)
///     .after_upload(|results| println!("{} results", results.len()));
/// # let _ = callbacks;
/// ```
#[derive(Clone, Default)]
pub struct Callbacks {
    on_load: Option<LoadHook>,
    before_upload: Option<BeforeHook>,
    after_upload: Option<AfterHook>,
}

impl Callbacks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per file as it is loaded into the widget.
    #[must_use]
    pub fn on_load(mut self, hook: impl Fn(&FileDescriptor) + 'static) -> Self {
        self.on_load = Some(Rc::new(hook));
        self
    }

    /// Called with the displayed files before anything is sent.
    /// Returning `false` cancels the upload.
    #[must_use]
    pub fn before_upload(mut self, hook: impl Fn(&[FileDescriptor]) -> bool + 'static) -> Self {
        self.before_upload = Some(Rc::new(move |files: Vec<FileDescriptor>| {
            futures::future::ready(hook(&files)).boxed_local()
        }));
        self
    }

    /// Asynchronous form of [`before_upload`](Self::before_upload), e.g.
    /// for a confirmation dialog.
    #[must_use]
    pub fn before_upload_async<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Vec<FileDescriptor>) -> Fut + 'static,
        Fut: Future<Output = bool> + 'static,
    {
        self.before_upload = Some(Rc::new(move |files| hook(files).boxed_local()));
        self
    }

    /// Called with the upload results once the upload finishes.
    #[must_use]
    pub fn after_upload(mut self, hook: impl Fn(&[UploadResult]) + 'static) -> Self {
        self.after_upload = Some(Rc::new(hook));
        self
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_load", &self.on_load.is_some())
            .field("before_upload", &self.before_upload.is_some())
            .field("after_upload", &self.after_upload.is_some())
            .finish()
    }
}

/// Notified whenever the displayed file list changes.
///
/// This is the seam a preview renders through: it receives the full
/// display list and rebuilds from scratch.
pub trait DisplayObserver {
    fn display_changed(&self, display: &[FileDescriptor]);
}

impl<F: Fn(&[FileDescriptor])> DisplayObserver for F {
    fn display_changed(&self, display: &[FileDescriptor]) {
        self(display);
    }
}

/// File selection, validation, and upload for one widget.
pub struct Uploader<T> {
    options: UploadOptions,
    upload_mode: UploadMode,
    upload_url: String,
    callbacks: Callbacks,
    transport: T,
    store: RefCell<FileStore>,
    state: Cell<UploaderState>,
    observers: RefCell<Vec<Rc<dyn DisplayObserver>>>,
}

impl<T: UploadTransport> Uploader<T> {
    /// Create an uploader and load the configured existing files.
    ///
    /// Existing files are stored in `existingFiles`, shown in
    /// `displayFiles`, and passed to `on_load` one by one.
    pub fn new(config: UploaderConfig, callbacks: Callbacks, transport: T) -> Self {
        let existing: Vec<FileDescriptor> = config
            .existing_files
            .iter()
            .map(crate::config::ExistingFile::to_descriptor)
            .collect();

        let uploader = Self {
            options: config.options,
            upload_mode: config.upload_mode,
            upload_url: config.upload_url,
            callbacks,
            transport,
            store: RefCell::new(FileStore::new()),
            state: Cell::new(UploaderState::Idle),
            observers: RefCell::new(Vec::new()),
        };

        if !existing.is_empty() {
            debug!(count = existing.len(), "loading existing files");
            {
                let mut store = uploader.store.borrow_mut();
                store.set(
                    Bucket::ExistingFiles,
                    existing.iter().cloned().map(Into::into).collect(),
                );
                store.add_to(Bucket::DisplayFiles, existing.iter().cloned());
            }
            uploader.state.set(UploaderState::FilesStaged);
            uploader.fire_on_load(&existing);
        }

        uploader
    }

    /// Register an observer for display list changes.
    pub fn subscribe(&self, observer: Rc<dyn DisplayObserver>) {
        self.observers.borrow_mut().push(observer);
    }

    /// Take in newly selected or dropped files.
    ///
    /// The files are appended to `displayFiles` and `needUploadFiles`,
    /// `on_load` runs once per file in the given order, then observers
    /// are notified. An empty capture is ignored.
    pub fn capture(&self, files: Vec<FileDescriptor>) {
        if files.is_empty() {
            return;
        }
        debug!(count = files.len(), "captured files");
        {
            let mut store = self.store.borrow_mut();
            store.add_to(Bucket::DisplayFiles, files.iter().cloned());
            store.add_to(Bucket::NeedUploadFiles, files.iter().cloned());
        }
        if self.state.get() == UploaderState::Idle {
            self.state.set(UploaderState::FilesStaged);
        }
        self.fire_on_load(&files);
        self.notify();
    }

    /// Validate and upload the displayed files.
    ///
    /// Only captured files are sent; pre-existing files count towards the
    /// validation limits but are already on the server. Results are
    /// appended to `uploadedFiles`, `after_upload` runs, and the files
    /// that were displayed when the upload started are cleared. With no
    /// captured files pending (an empty display, or one holding only
    /// existing files) this returns [`UploadRun::NothingToUpload`].
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Validation`] if the selection violates the
    /// options (nothing is sent), or [`UploadError::InProgress`] if this
    /// uploader is already uploading.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; Rc state is !Send
    pub async fn upload(&self) -> Result<UploadRun, UploadError> {
        if self.state.get() == UploaderState::Uploading {
            return Err(UploadError::InProgress);
        }

        let display = self.display_files();
        let pending = self.need_upload_files();
        if pending.is_empty() {
            let displayed = display.len();
            warn!(
                displayed,
                "upload requested with no new files selected"
            );
            return Ok(UploadRun::NothingToUpload);
        }

        self.state.set(UploaderState::Uploading);

        if let Err(e) = validate(&display, &self.options) {
            info!(error = ?e, "selection failed validation");
            self.state.set(UploaderState::FilesStaged);
            return Err(e.into());
        }

        // `pending` is fixed before the hook so the approved list is what
        // gets sent, even if the selection changes while it runs.
        if let Some(hook) = self.callbacks.before_upload.clone()
            && !hook(display.clone()).await
        {
            info!("upload cancelled by before_upload");
            self.state.set(UploaderState::FilesStaged);
            return Ok(UploadRun::Cancelled);
        }

        let results =
            client::upload_all(&self.transport, &self.upload_url, &pending, self.upload_mode).await;

        self.store
            .borrow_mut()
            .add_to(Bucket::UploadedFiles, results.iter().cloned());

        if let Some(hook) = self.callbacks.after_upload.clone() {
            hook(&results);
        }

        // Only the files this run saw are cleared; captures made while it
        // was in flight stay staged for the next upload.
        {
            let mut store = self.store.borrow_mut();
            for file in &display {
                store.remove(Bucket::DisplayFiles, file.id());
            }
            for file in &pending {
                store.remove(Bucket::NeedUploadFiles, file.id());
            }
        }
        self.state.set(UploaderState::Idle);
        self.settle_state();
        self.notify();

        Ok(UploadRun::Completed(results))
    }

    /// Remove a file from the display by identity.
    ///
    /// A pre-existing file is queued in `needDeleteFiles`. Returns whether
    /// the file was displayed.
    pub fn remove_file(&self, id: FileId) -> bool {
        let removed = {
            let mut store = self.store.borrow_mut();
            let removed = store.remove(Bucket::DisplayFiles, id);
            store.remove(Bucket::NeedUploadFiles, id);
            let existing = store
                .files(Bucket::ExistingFiles)
                .find(|f| f.id() == id)
                .cloned();
            if removed && let Some(existing) = existing {
                store.add_to(Bucket::NeedDeleteFiles, [existing]);
            }
            removed
        };
        if removed {
            self.settle_state();
            self.notify();
        }
        removed
    }

    /// Clear the display and the pending uploads.
    pub fn reset_files(&self) {
        {
            let mut store = self.store.borrow_mut();
            store.reset(Bucket::DisplayFiles);
            store.reset(Bucket::NeedUploadFiles);
        }
        self.settle_state();
        self.notify();
    }

    /// Files currently shown (existing + captured).
    #[must_use]
    pub fn display_files(&self) -> Vec<FileDescriptor> {
        self.store.borrow().cloned_files(Bucket::DisplayFiles)
    }

    #[must_use]
    pub fn existing_files(&self) -> Vec<FileDescriptor> {
        self.store.borrow().cloned_files(Bucket::ExistingFiles)
    }

    /// Captured files not yet uploaded.
    #[must_use]
    pub fn need_upload_files(&self) -> Vec<FileDescriptor> {
        self.store.borrow().cloned_files(Bucket::NeedUploadFiles)
    }

    /// Existing files the user removed.
    #[must_use]
    pub fn need_delete_files(&self) -> Vec<FileDescriptor> {
        self.store.borrow().cloned_files(Bucket::NeedDeleteFiles)
    }

    /// Results of every completed upload, oldest first.
    #[must_use]
    pub fn uploaded_files(&self) -> Vec<UploadResult> {
        self.store
            .borrow()
            .get(Bucket::UploadedFiles)
            .iter()
            .filter_map(|e| e.as_upload_result().cloned())
            .collect()
    }

    #[must_use]
    pub fn deleted_files(&self) -> Vec<FileDescriptor> {
        self.store.borrow().cloned_files(Bucket::DeletedFiles)
    }

    #[must_use]
    pub fn state(&self) -> UploaderState {
        self.state.get()
    }

    #[must_use]
    pub const fn options(&self) -> &UploadOptions {
        &self.options
    }

    #[must_use]
    pub const fn upload_mode(&self) -> UploadMode {
        self.upload_mode
    }

    #[must_use]
    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    fn fire_on_load(&self, files: &[FileDescriptor]) {
        if let Some(hook) = self.callbacks.on_load.clone() {
            for file in files {
                hook(file);
            }
        }
    }

    /// Drop back to `Idle` or `FilesStaged` to match the display, unless
    /// an upload is running.
    fn settle_state(&self) {
        if self.state.get() == UploaderState::Uploading {
            return;
        }
        let next = if self.store.borrow().is_empty(Bucket::DisplayFiles) {
            UploaderState::Idle
        } else {
            UploaderState::FilesStaged
        };
        self.state.set(next);
    }

    fn notify(&self) {
        let display = self.display_files();
        // Clone the list so observers may subscribe re-entrantly.
        let observers = self.observers.borrow().clone();
        for observer in observers {
            observer.display_changed(&display);
        }
    }
}
