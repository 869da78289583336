use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::{
    app_state::AppState,
    platform::{detect_platform, PlatformTag},
};

use super::downloads::user_agent;

#[derive(Debug, Serialize)]
pub struct PlatformResponse {
    pub platform: PlatformTag,
    pub download: Option<PlatformDownload>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformDownload {
    pub filename: Option<String>,
    pub label: String,
    pub icon: String,
    pub available: bool,
    pub store_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CatalogFile {
    pub platform: PlatformTag,
    pub label: String,
    pub icon: String,
    pub filename: String,
    pub available: bool,
}

/// GET /api/platform: detected platform and the matching download, checked live.
pub async fn platform_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<PlatformResponse> {
    let platform = detect_platform(user_agent(&headers));
    let catalog = state.catalog();

    let download = match catalog.describe(platform) {
        Some(descriptor) => Some(PlatformDownload {
            filename: descriptor.filename.clone(),
            label: descriptor.label.clone(),
            icon: descriptor.icon.clone(),
            available: catalog.status(descriptor).await.exists,
            store_url: descriptor.store_url.clone(),
        }),
        None => None,
    };

    Json(PlatformResponse { platform, download })
}

/// GET /api/files: every locally hosted installer with its live availability.
pub async fn files_handler(State(state): State<AppState>) -> Json<Vec<CatalogFile>> {
    let catalog = state.catalog();
    let mut files = Vec::new();

    for (descriptor, filename) in catalog.local_files() {
        files.push(CatalogFile {
            platform: descriptor.platform,
            label: descriptor.label.clone(),
            icon: descriptor.icon.clone(),
            filename: filename.to_string(),
            available: catalog.status(descriptor).await.exists,
        });
    }

    Json(files)
}
