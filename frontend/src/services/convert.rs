//! HTTP calls to the camconv backend and the CSV download helper.

use gloo_net::http::Request;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, File, FormData, HtmlAnchorElement, Url};

use crate::types::{AppError, AppResult, ConvertRequest, ConvertResponse, ErrorBody, OptionsResponse};

/// Fetch the selectable frames, datums and bounds
pub async fn fetch_options(backend_url: &str) -> AppResult<OptionsResponse> {
    let url = format!("{}/api/options", backend_url);
    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| AppError::Network(e.to_string()))?;

    if !response.ok() {
        return Err(AppError::Network(format!("Server error ({})", response.status())));
    }

    response
        .json::<OptionsResponse>()
        .await
        .map_err(|e| AppError::Network(format!("Failed to parse options: {}", e)))
}

/// Upload a CSV file with its conversion parameters
pub async fn convert_csv(file: File, request: &ConvertRequest, backend_url: &str) -> AppResult<ConvertResponse> {
    let params = serde_json::to_string(request).map_err(|e| AppError::Validation(e.to_string()))?;

    let form_data = FormData::new().map_err(|e| AppError::Network(format!("Failed to create FormData: {:?}", e)))?;
    form_data
        .append_with_blob_and_filename("file", &file, &file.name())
        .map_err(|e| AppError::Network(format!("Failed to append file: {:?}", e)))?;
    form_data
        .append_with_str("params", &params)
        .map_err(|e| AppError::Network(format!("Failed to append parameters: {:?}", e)))?;

    let url = format!("{}/api/convert", backend_url);
    let response = Request::post(&url)
        .body(form_data)
        .map_err(|e| AppError::Network(format!("Failed to build request: {}", e)))?
        .send()
        .await
        .map_err(|e| AppError::Network(format!("HTTP request failed: {}", e)))?;

    if !response.ok() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(error_from_body(status, &text));
    }

    response
        .json::<ConvertResponse>()
        .await
        .map_err(|e| AppError::Network(format!("Failed to parse response: {}", e)))
}

/// Turn an error response into the message shown in the banner
pub fn error_from_body(status: u16, text: &str) -> AppError {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) => AppError::Conversion {
            message: body.error,
            kind: body.kind,
        },
        Err(_) => AppError::Network(format!("Server error ({})", status)),
    }
}

/// Offer `content` as a CSV download named `file_name`
pub fn download_csv(file_name: &str, content: &str) -> AppResult<()> {
    let fail = |what: &str| AppError::Validation(format!("Download failed: {}", what));

    let parts = js_sys::Array::of1(&content.into());
    let options = BlobPropertyBag::new();
    options.set_type("text/csv;charset=utf-8");
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(|_| fail("blob"))?;
    let url = Url::create_object_url_with_blob(&blob).map_err(|_| fail("object url"))?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| fail("no document"))?;
    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(|_| fail("anchor"))?
        .dyn_into()
        .map_err(|_| fail("anchor"))?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    Url::revoke_object_url(&url).map_err(|_| fail("revoke"))?;
    Ok(())
}
