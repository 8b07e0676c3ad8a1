//! Multipart upload via the browser `fetch` API.
//!
//! [`FetchTransport`] builds a `FormData` body with one Blob entry per
//! file, `POST`s it, and decodes the JSON response. The browser sets
//! the multipart boundary header itself.
//!
//! All functions in this module require a browser environment
//! (`wasm32-unknown-unknown` target).

use serde_json::Value;
use upfile_core::{FileDescriptor, TransportError, UploadTransport};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::blob;

/// [`UploadTransport`] backed by `window.fetch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

impl UploadTransport for FetchTransport {
    #[allow(clippy::future_not_send)] // WASM is single-threaded; JsFuture is !Send
    async fn post_multipart(
        &self,
        url: &str,
        field: &str,
        files: &[FileDescriptor],
    ) -> Result<Value, TransportError> {
        let form = build_form(field, files)?;

        let init = web_sys::RequestInit::new();
        init.set_method("POST");
        init.set_body(&form);

        let window =
            web_sys::window().ok_or_else(|| TransportError::Browser("no global window".into()))?;
        let response = JsFuture::from(window.fetch_with_str_and_init(url, &init))
            .await
            .map_err(|e| TransportError::Network(js_message(&e)))?
            .dyn_into::<web_sys::Response>()
            .map_err(|e| TransportError::Browser(format!("fetch did not return a Response: {e:?}")))?;

        // Non-2xx is a uniform failure; the body is not inspected.
        if !response.ok() {
            return Err(TransportError::Http {
                status: response.status(),
            });
        }

        let text_promise = response
            .text()
            .map_err(|e| TransportError::Browser(js_message(&e)))?;
        let text = JsFuture::from(text_promise)
            .await
            .map_err(|e| TransportError::Network(js_message(&e)))?
            .as_string()
            .ok_or_else(|| TransportError::InvalidResponse("response body is not text".into()))?;

        serde_json::from_str(&text).map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }
}

/// Build a `FormData` with every file appended under `field`.
fn build_form(field: &str, files: &[FileDescriptor]) -> Result<web_sys::FormData, TransportError> {
    let form =
        web_sys::FormData::new().map_err(|e| TransportError::Browser(js_message(&e)))?;
    for file in files {
        let blob = blob::file_to_blob(file).map_err(|e| TransportError::Browser(e.to_string()))?;
        form.append_with_blob_and_filename(field, &blob, file.name())
            .map_err(|e| TransportError::Browser(js_message(&e)))?;
    }
    Ok(form)
}

/// Best-effort human-readable text for a thrown JS value.
fn js_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}
