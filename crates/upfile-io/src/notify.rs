//! Blocking browser dialogs.
//!
//! The uploader reports an empty selection with `window.alert`, and
//! applications commonly confirm before sending with `window.confirm`.

/// Message shown when upload is triggered with nothing selected.
pub const EMPTY_SELECTION_MESSAGE: &str = "업로드 할 파일이 없습니다.";

/// Show a modal alert. Does nothing outside a browser window.
pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

/// Ask the user a yes/no question.
///
/// Returns `false` if there is no window or the dialog is suppressed.
#[must_use]
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}
