//! Integration tests: drive an uploader end to end against scripted
//! transports.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::executor::block_on;
use serde_json::{Value, json};
use upfile_core::client::upload_multiple;
use upfile_core::{
    Callbacks, ExistingFile, FileDescriptor, TransportError, UploadError, UploadMode, UploadResult,
    UploadRun, UploadStatus, UploadTransport, Uploader, UploaderConfig, UploaderState,
    ValidationError,
};

/// Returns queued replies in order and records every request.
#[derive(Default)]
struct ScriptedTransport {
    replies: RefCell<Vec<Result<Value, TransportError>>>,
    requests: RefCell<Vec<Request>>,
}

#[derive(Debug, Clone, PartialEq)]
struct Request {
    url: String,
    field: String,
    names: Vec<String>,
}

impl ScriptedTransport {
    fn replying(replies: Vec<Result<Value, TransportError>>) -> Self {
        let mut replies = replies;
        replies.reverse();
        Self {
            replies: RefCell::new(replies),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl UploadTransport for ScriptedTransport {
    async fn post_multipart(
        &self,
        url: &str,
        field: &str,
        files: &[FileDescriptor],
    ) -> Result<Value, TransportError> {
        self.requests.borrow_mut().push(Request {
            url: url.to_owned(),
            field: field.to_owned(),
            names: files.iter().map(|f| f.name().to_owned()).collect(),
        });
        self.replies
            .borrow_mut()
            .pop()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted reply".into())))
    }
}

/// Yields to the executor a fixed number of times before completing.
struct YieldTimes(usize);

impl Future for YieldTimes {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 == 0 {
            Poll::Ready(())
        } else {
            self.0 -= 1;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Completes requests for files named `slow*` last and records the
/// completion order.
#[derive(Default)]
struct StaggeredTransport {
    completed: RefCell<Vec<String>>,
}

impl UploadTransport for StaggeredTransport {
    async fn post_multipart(
        &self,
        _url: &str,
        _field: &str,
        files: &[FileDescriptor],
    ) -> Result<Value, TransportError> {
        let name = files[0].name().to_owned();
        let delay = if name.starts_with("slow") { 5 } else { 0 };
        YieldTimes(delay).await;
        self.completed.borrow_mut().push(name.clone());
        Ok(json!({ "name": name }))
    }
}

fn file(name: &str, size: usize) -> FileDescriptor {
    FileDescriptor::new(name, "application/octet-stream", vec![7u8; size])
}

#[test]
fn multi_upload_zips_server_array_onto_inputs() {
    let transport = ScriptedTransport::replying(vec![Ok(json!([{"id": 1}, {"id": 2}]))]);
    let a = file("a.bin", 3);
    let b = file("b.bin", 4);

    let results = block_on(upload_multiple(
        &transport,
        "https://upload.test/files",
        &[a.clone(), b.clone()],
    ));

    assert_eq!(
        results,
        vec![
            UploadResult::success(a, json!({"id": 1})),
            UploadResult::success(b, json!({"id": 2})),
        ]
    );
    assert!(results.iter().all(|r| r.status() == UploadStatus::Success));
}

#[test]
fn too_few_files_fails_before_the_network() {
    let mut config = UploaderConfig::new("/upload");
    config.options.min_files = 2;
    let uploader = Uploader::new(config, Callbacks::new(), ScriptedTransport::default());
    uploader.capture(vec![file("only.txt", 1)]);

    let err = block_on(uploader.upload()).unwrap_err();

    assert_eq!(
        err,
        UploadError::Validation(ValidationError::TooFewFiles { count: 1, min: 2 })
    );
    assert!(uploader.transport().requests.borrow().is_empty());
}

#[test]
fn before_upload_false_blocks_the_network_and_keeps_display() {
    let uploader = Uploader::new(
        UploaderConfig::new("/upload"),
        Callbacks::new().before_upload(|_| false),
        ScriptedTransport::default(),
    );
    let a = file("a.txt", 1);
    let b = file("b.txt", 1);
    uploader.capture(vec![a.clone(), b.clone()]);

    let run = block_on(uploader.upload()).unwrap();

    assert_eq!(run, UploadRun::Cancelled);
    assert_eq!(uploader.display_files(), vec![a, b]);
    assert!(uploader.transport().requests.borrow().is_empty());
    assert!(uploader.uploaded_files().is_empty());
}

#[test]
fn before_upload_returning_true_proceeds() {
    let calls = Rc::new(Cell::new(0));
    let calls_hook = Rc::clone(&calls);
    let uploader = Uploader::new(
        UploaderConfig::new("/upload"),
        Callbacks::new().before_upload(move |files| {
            calls_hook.set(files.len());
            true
        }),
        ScriptedTransport::replying(vec![Ok(json!([{"ok": true}]))]),
    );
    uploader.capture(vec![file("a.txt", 1)]);

    let run = block_on(uploader.upload()).unwrap();

    assert!(matches!(run, UploadRun::Completed(ref r) if r.len() == 1));
    assert_eq!(calls.get(), 1);
}

#[test]
fn single_mode_keeps_input_order_when_completion_is_reordered() {
    let mut config = UploaderConfig::new("/upload");
    config.upload_mode = UploadMode::Single;
    let uploader = Uploader::new(config, Callbacks::new(), StaggeredTransport::default());
    uploader.capture(vec![file("slow-a", 1), file("fast-b", 1), file("fast-c", 1)]);

    let UploadRun::Completed(results) = block_on(uploader.upload()).unwrap() else {
        unreachable!("expected a completed run");
    };

    let completed = uploader.transport().completed.borrow().clone();
    assert_eq!(completed.last().map(String::as_str), Some("slow-a"));
    let names: Vec<&str> = results.iter().map(|r| r.file.name()).collect();
    assert_eq!(names, vec!["slow-a", "fast-b", "fast-c"]);
    assert_eq!(results[0].result(), Some(&json!({"name": "slow-a"})));
}

#[test]
fn multi_mode_failure_marks_every_file() {
    let uploader = Uploader::new(
        UploaderConfig::new("/upload"),
        Callbacks::new(),
        ScriptedTransport::replying(vec![Err(TransportError::Http { status: 502 })]),
    );
    uploader.capture(vec![file("a", 1), file("b", 1), file("c", 1)]);

    let UploadRun::Completed(results) = block_on(uploader.upload()).unwrap() else {
        unreachable!("expected a completed run");
    };

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.status() == UploadStatus::Error));
    // Failed results are still recorded and the display still clears.
    assert_eq!(uploader.uploaded_files().len(), 3);
    assert!(uploader.display_files().is_empty());
    assert_eq!(uploader.state(), UploaderState::Idle);
}

#[test]
fn existing_files_count_for_validation_but_are_not_resent() {
    let mut config = UploaderConfig::new("/upload");
    config.options.max_files = Some(2);
    config.existing_files = vec![ExistingFile {
        name: "already-there.png".into(),
        size: 100,
        mime_type: "image/png".into(),
    }];
    let uploader = Uploader::new(
        config,
        Callbacks::new(),
        ScriptedTransport::replying(vec![Ok(json!([{"id": 42}]))]),
    );

    uploader.capture(vec![file("new.png", 5)]);
    let run = block_on(uploader.upload()).unwrap();

    let requests = uploader.transport().requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0],
        Request {
            url: "/upload".into(),
            field: "files".into(),
            names: vec!["new.png".into()],
        }
    );
    assert!(matches!(run, UploadRun::Completed(ref r) if r.len() == 1));

    // The display was cleared by the upload; three new files alone exceed max_files.
    drop(requests);
    uploader.capture(vec![file("x", 1), file("y", 1), file("z", 1)]);
    assert!(matches!(
        block_on(uploader.upload()),
        Err(UploadError::Validation(ValidationError::TooManyFiles { .. }))
    ));
}

#[test]
fn removing_an_existing_file_queues_it_for_deletion() {
    let mut config = UploaderConfig::new("/upload");
    config.existing_files = vec![ExistingFile {
        name: "stale.doc".into(),
        size: 1,
        mime_type: "application/msword".into(),
    }];
    let uploader = Uploader::new(config, Callbacks::new(), ScriptedTransport::default());
    let stale = uploader.existing_files()[0].clone();

    assert!(uploader.remove_file(stale.id()));

    assert_eq!(uploader.need_delete_files(), vec![stale]);
    assert!(uploader.display_files().is_empty());
    assert_eq!(uploader.state(), UploaderState::Idle);
}

#[test]
fn a_second_upload_while_one_is_running_is_rejected() {
    let uploader = Uploader::new(
        UploaderConfig::new("/upload"),
        Callbacks::new().before_upload_async(|_| yield_then_proceed()),
        ScriptedTransport::replying(vec![Ok(json!([{"id": 1}]))]),
    );
    uploader.capture(vec![file("a", 1)]);

    let (first, second) = block_on(async {
        let first = uploader.upload();
        let second = async {
            // Runs while the first call is suspended in before_upload.
            uploader.upload().await
        };
        futures::join!(first, second)
    });

    assert!(matches!(first, Ok(UploadRun::Completed(_))));
    assert_eq!(second, Err(UploadError::InProgress));
}

async fn yield_then_proceed() -> bool {
    YieldTimes(2).await;
    true
}

#[test]
fn files_captured_during_an_upload_stay_staged() {
    let mut config = UploaderConfig::new("/upload");
    config.upload_mode = UploadMode::Single;
    let uploader = Uploader::new(config, Callbacks::new(), StaggeredTransport::default());
    uploader.capture(vec![file("slow-a", 1)]);
    let late = file("late", 1);

    let (run, ()) = block_on(async {
        futures::join!(uploader.upload(), async {
            YieldTimes(1).await;
            assert_eq!(uploader.state(), UploaderState::Uploading);
            uploader.capture(vec![late.clone()]);
        })
    });

    let UploadRun::Completed(results) = run.unwrap() else {
        unreachable!("expected a completed run");
    };
    let names: Vec<&str> = results.iter().map(|r| r.file.name()).collect();
    assert_eq!(names, vec!["slow-a"]);
    assert_eq!(uploader.display_files(), vec![late.clone()]);
    assert_eq!(uploader.need_upload_files(), vec![late]);
    assert_eq!(uploader.state(), UploaderState::FilesStaged);

    // The late file goes out with the next upload.
    let UploadRun::Completed(results) = block_on(uploader.upload()).unwrap() else {
        unreachable!("expected a completed run");
    };
    assert_eq!(results[0].file.name(), "late");
    assert!(uploader.display_files().is_empty());
    assert_eq!(uploader.state(), UploaderState::Idle);
}

fn with_existing(name: &str) -> UploaderConfig {
    let mut config = UploaderConfig::new("/upload");
    config.existing_files = vec![ExistingFile {
        name: name.into(),
        size: 10,
        mime_type: "application/pdf".into(),
    }];
    config
}

#[test]
fn only_existing_files_means_nothing_to_upload() {
    let after_calls = Rc::new(Cell::new(0));
    let after_hook = Rc::clone(&after_calls);
    let uploader = Uploader::new(
        with_existing("terms.pdf"),
        Callbacks::new()
            .before_upload(|_| unreachable!("before_upload must not run"))
            .after_upload(move |_| after_hook.set(after_hook.get() + 1)),
        ScriptedTransport::default(),
    );

    let run = block_on(uploader.upload()).unwrap();

    assert_eq!(run, UploadRun::NothingToUpload);
    assert_eq!(after_calls.get(), 0);
    assert_eq!(uploader.display_files().len(), 1);
    assert_eq!(uploader.display_files(), uploader.existing_files());
    assert_eq!(uploader.state(), UploaderState::FilesStaged);
    assert!(uploader.transport().requests.borrow().is_empty());
}

#[test]
fn upload_with_existing_files_clears_the_display_but_keeps_them_recorded() {
    let uploader = Uploader::new(
        with_existing("terms.pdf"),
        Callbacks::new(),
        ScriptedTransport::replying(vec![Ok(json!([{"id": 9}]))]),
    );
    uploader.capture(vec![file("new.pdf", 3)]);

    let run = block_on(uploader.upload()).unwrap();

    assert!(matches!(run, UploadRun::Completed(ref r) if r.len() == 1));
    assert!(uploader.display_files().is_empty());
    assert!(uploader.need_upload_files().is_empty());
    assert_eq!(uploader.existing_files().len(), 1);
    assert_eq!(uploader.existing_files()[0].name(), "terms.pdf");
    assert_eq!(uploader.state(), UploaderState::Idle);
}

#[test]
fn the_approved_selection_is_what_gets_sent() {
    let uploader = Uploader::new(
        UploaderConfig::new("/upload"),
        Callbacks::new().before_upload_async(|_| yield_then_proceed()),
        ScriptedTransport::replying(vec![Ok(json!([{"id": 1}, {"id": 2}]))]),
    );
    let a = file("a", 1);
    let b = file("b", 1);
    uploader.capture(vec![a, b.clone()]);

    let (run, ()) = block_on(async {
        futures::join!(uploader.upload(), async {
            // The confirmation is still open.
            YieldTimes(1).await;
            assert!(uploader.remove_file(b.id()));
        })
    });

    assert!(matches!(run, Ok(UploadRun::Completed(ref r)) if r.len() == 2));
    let requests = uploader.transport().requests.borrow();
    assert_eq!(requests[0].names, vec!["a".to_owned(), "b".to_owned()]);
}
