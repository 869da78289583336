use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

/// `302 Found` redirect. Browsers and clients follow it with a GET.
pub fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => server_error_response(),
    }
}

/// Build an `attachment` Content-Disposition header with an ASCII-safe filename.
pub fn build_content_disposition_header(filename: &str) -> HeaderValue {
    let mut fallback: String = filename
        .chars()
        .map(|ch| {
            if matches!(ch, ' '..='~') && ch != '"' && ch != '\\' {
                ch
            } else {
                '_'
            }
        })
        .take(255)
        .collect();

    if fallback.is_empty() {
        fallback.push_str("download.bin");
    }

    HeaderValue::from_str(&format!("attachment; filename=\"{fallback}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// Canonical application server error response body.
pub fn server_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "No se pudo procesar la solicitud. Intente más tarde.",
    )
        .into_response()
}

/// Convenience for attaching a `Retry-After` header to rate-limited responses.
pub fn attach_retry_after(response: &mut Response, seconds: u64) {
    if let Ok(value) = HeaderValue::from_str(&seconds.max(1).to_string()) {
        response.headers_mut().insert(header::RETRY_AFTER, value);
    }
}
