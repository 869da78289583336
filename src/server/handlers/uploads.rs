use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::response::Response;
use tower_sessions::Session;
use tracing::{debug, error, info, warn};

use crate::{
    app_state::AppState,
    uploads::{persist_upload, PersistedUpload, UploadError},
};

use crate::server::{constants::UPLOAD_FIELD_NAME, utils::found};

use super::shared::require_admin;

const UPLOAD_SUCCESS_PATH: &str = "/admin/dashboard?success=1";
const UPLOAD_FAILED_PATH: &str = "/admin/dashboard?error=upload";

/// POST /admin/upload: replace one catalog installer with the uploaded file.
///
/// Always answers with a redirect back to the dashboard; failure detail only goes
/// to the log.
pub async fn upload_submit_handler(
    State(state): State<AppState>,
    session: Session,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    if let Err(response) = require_admin(&session).await {
        return response;
    }

    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(err) => {
            warn!(target: "upload", %err, "upload request is not multipart");
            return found(UPLOAD_FAILED_PATH);
        }
    };

    match receive_upload(&state, multipart).await {
        Ok(upload) => {
            info!(
                target: "upload",
                filename = %upload.filename,
                size_bytes = upload.size_bytes,
                "installer uploaded"
            );
            found(UPLOAD_SUCCESS_PATH)
        }
        Err(UploadError::Io(err)) => {
            error!(target: "upload", %err, "failed to persist uploaded installer");
            found(UPLOAD_FAILED_PATH)
        }
        Err(err) => {
            warn!(target: "upload", %err, "upload rejected");
            found(UPLOAD_FAILED_PATH)
        }
    }
}

async fn receive_upload(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<PersistedUpload, UploadError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            debug!(
                target: "upload",
                field = field.name().unwrap_or(""),
                "skipping unexpected multipart field"
            );
            continue;
        }

        return persist_upload(field, state.upload_validator(), state.catalog().root()).await;
    }

    Err(UploadError::MissingFile)
}
