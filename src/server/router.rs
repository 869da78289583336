use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::app_state::AppState;
use crate::server::constants::MULTIPART_OVERHEAD_BYTES;
use crate::server::handlers;

/// Construct the application's HTTP router with all routes and middleware configured.
///
/// Admin sessions live in `session_store`; their cookies are signed with `session_key`.
pub fn build_router<S>(state: AppState, session_store: S, session_key: Key) -> Router
where
    S: SessionStore + Clone,
{
    let config = state.config();

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.security.cookie_secure)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_path("/")
        .with_name(config.session.cookie_name.clone())
        .with_signed(session_key);

    let upload_body_limit = config
        .storage
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let upload_routes = Router::new()
        .route(
            "/admin/upload",
            post(handlers::uploads::upload_submit_handler),
        )
        .layer(DefaultBodyLimit::max(
            usize::try_from(upload_body_limit).unwrap_or(usize::MAX),
        ));

    let mut router = Router::new()
        .route("/api/platform", get(handlers::api::platform_handler))
        .route("/api/files", get(handlers::api::files_handler))
        .route(
            "/download",
            get(handlers::downloads::detected_download_handler),
        )
        .route(
            "/download/:platform",
            get(handlers::downloads::platform_download_handler),
        )
        .route("/admin", get(handlers::admin::login_form_handler))
        .route("/admin/login", post(handlers::admin::login_submit_handler))
        .route(
            "/admin/dashboard",
            get(handlers::admin::dashboard_handler),
        )
        .route("/admin/logout", post(handlers::admin::logout_handler))
        .merge(upload_routes);

    if let Some(public_root) = config.storage.public_root.as_ref() {
        router = router.fallback_service(ServeDir::new(public_root));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(session_layer),
        )
        .with_state(state)
}
