use std::path::Path;

use axum::{
    body::Body,
    extract::{Path as AxumPath, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use crate::{
    app_state::AppState,
    dispatch::{resolve, DispatchOutcome},
    platform::{detect_platform, PlatformTag},
};

use crate::server::utils::{build_content_disposition_header, found};

/// Body returned when a catalog file is missing at transfer time.
#[derive(Debug, Serialize)]
pub struct FileUnavailableBody {
    pub error: &'static str,
    pub platform: PlatformTag,
    pub filename: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UnknownPlatformBody {
    pub error: String,
}

/// GET /download: pick the installer from the client's `User-Agent`.
pub async fn detected_download_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let user_agent = user_agent(&headers);
    let platform = detect_platform(user_agent);

    match resolve(state.catalog(), platform) {
        DispatchOutcome::Unrecognized => {
            info!(target: "downloads", %user_agent, "download requested from unrecognized platform");
            (StatusCode::BAD_REQUEST, "Plataforma no reconocida.").into_response()
        }
        outcome => fulfil(platform, outcome).await,
    }
}

/// GET /download/:platform: explicit, case-insensitive platform selection.
pub async fn platform_download_handler(
    State(state): State<AppState>,
    AxumPath(raw_platform): AxumPath<String>,
) -> Response {
    let requested = raw_platform.to_lowercase();
    let outcome = match requested.parse::<PlatformTag>() {
        Ok(platform) => (platform, resolve(state.catalog(), platform)),
        Err(_) => (PlatformTag::Unknown, DispatchOutcome::Unrecognized),
    };

    match outcome {
        (_, DispatchOutcome::Unrecognized) => (
            StatusCode::BAD_REQUEST,
            Json(UnknownPlatformBody {
                error: format!("Plataforma desconocida: {requested}"),
            }),
        )
            .into_response(),
        (platform, outcome) => fulfil(platform, outcome).await,
    }
}

pub(crate) fn user_agent(headers: &HeaderMap) -> &str {
    headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

async fn fulfil(platform: PlatformTag, outcome: DispatchOutcome) -> Response {
    match outcome {
        DispatchOutcome::Redirect(url) => {
            info!(target: "downloads", %platform, %url, "redirecting to external store");
            found(&url)
        }
        DispatchOutcome::Serve {
            path,
            download_name,
        } => serve_file(platform, &path, &download_name).await,
        DispatchOutcome::NotFound | DispatchOutcome::Unrecognized => {
            (StatusCode::NOT_FOUND, "Archivo no disponible.").into_response()
        }
    }
}

/// Stream a catalog file. A file that vanished since it was listed is reported with a
/// structured 404 rather than an error.
async fn serve_file(platform: PlatformTag, path: &Path, download_name: &str) -> Response {
    let opened = match fs::File::open(path).await {
        Ok(file) => match file.metadata().await {
            Ok(metadata) if metadata.is_file() => Ok((file, metadata.len())),
            Ok(_) => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "catalog path is not a regular file",
            )),
            Err(err) => Err(err),
        },
        Err(err) => Err(err),
    };

    let (file, size_bytes) = match opened {
        Ok(opened) => opened,
        Err(err) => {
            warn!(
                target: "downloads",
                %err,
                %platform,
                path = %path.display(),
                "installer missing at transfer time"
            );
            return file_unavailable_response(platform, download_name);
        }
    };

    let content_type = HeaderValue::from_str(
        mime_guess::from_path(download_name)
            .first_or_octet_stream()
            .essence_str(),
    )
    .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    let mut response = Response::new(Body::from_stream(ReaderStream::new(file)));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(
        header::CONTENT_DISPOSITION,
        build_content_disposition_header(download_name),
    );
    headers.insert(
        header::HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size_bytes));

    info!(
        target: "downloads",
        %platform,
        filename = %download_name,
        size_bytes,
        "serving installer"
    );

    response
}

fn file_unavailable_response(platform: PlatformTag, filename: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(FileUnavailableBody {
            error: "Archivo no encontrado",
            platform,
            filename: filename.to_string(),
            message: "Coloca el archivo en la carpeta /downloads/",
        }),
    )
        .into_response()
}
