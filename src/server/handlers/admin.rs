use std::net::SocketAddr;

use axum::{
    extract::{rejection::FormRejection, ConnectInfo, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{error, info, warn};

use crate::{
    app_state::AppState,
    auth::{randomized_backoff, verify_admin_secret},
    catalog::display_size,
    sessions::{current_admin, destroy, establish_admin, grants_admin},
    templates::{
        DashboardRow, DashboardTemplate, FlashMessage, HtmlTemplate, LayoutContext, LoginTemplate,
    },
};

use crate::server::utils::{attach_retry_after, found};

use super::shared::{require_admin, DASHBOARD_PATH, LOGIN_PATH};

const LOGIN_FAILED_PATH: &str = "/admin?error=1";

#[derive(Debug, Default, Deserialize)]
pub struct LoginQueryParams {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQueryParams {
    #[serde(default)]
    pub success: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    password: String,
}

/// GET /admin: login form, or straight to the dashboard for an active admin.
pub async fn login_form_handler(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<LoginQueryParams>,
) -> Response {
    match current_admin(&session).await {
        Ok(admin) if grants_admin(admin.as_ref(), time::OffsetDateTime::now_utc()) => {
            return found(DASHBOARD_PATH);
        }
        Ok(_) => {}
        Err(err) => {
            error!(target: "sessions", %err, "failed to read session while rendering login");
        }
    }

    let show_error = query.error.as_deref().is_some_and(|flag| !flag.is_empty());
    let layout = LayoutContext::from_state(&state, "Acceso");
    HtmlTemplate::new(LoginTemplate::new(layout).with_error(show_error)).into_response()
}

/// POST /admin/login: verify the password and elevate the session.
pub async fn login_submit_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    session: Session,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    let client_ip = state.trusted_proxies().client_ip(addr.ip(), &headers);

    if let Err(err) = state.login_rate_limiter().check_ip(client_ip) {
        warn!(target: "auth", ip = %client_ip, %err, "rate limited admin login");
        let mut response = found(LOGIN_FAILED_PATH);
        attach_retry_after(&mut response, err.retry_after().as_secs());
        return response;
    }

    let password = match form {
        Ok(Form(form)) => form.password,
        Err(err) => {
            warn!(target: "auth", ip = %client_ip, %err, "malformed login form");
            String::new()
        }
    };

    if !verify_admin_secret(&password, state.admin_password()) {
        if state.admin_password().is_none() {
            warn!(target: "auth", ip = %client_ip, "login attempted while admin panel is disabled");
        } else {
            warn!(target: "auth", ip = %client_ip, "invalid admin password");
        }
        randomized_backoff().await;
        return found(LOGIN_FAILED_PATH);
    }

    match establish_admin(&session, state.session_ttl()).await {
        Ok(admin) => {
            info!(
                target: "auth",
                ip = %client_ip,
                expires_at = admin.expires_at,
                "admin session established"
            );
            found(DASHBOARD_PATH)
        }
        Err(err) => {
            error!(target: "auth", %err, "failed to persist admin session");
            found(LOGIN_FAILED_PATH)
        }
    }
}

/// GET /admin/dashboard: installer status and upload form.
pub async fn dashboard_handler(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<DashboardQueryParams>,
) -> Response {
    if let Err(response) = require_admin(&session).await {
        return response;
    }

    let catalog = state.catalog();
    let mut rows = Vec::new();
    for (descriptor, filename) in catalog.local_files() {
        let status = catalog.status(descriptor).await;
        rows.push(DashboardRow {
            icon: descriptor.icon.clone(),
            label: descriptor.label.clone(),
            filename: filename.to_string(),
            size_display: status.size_display,
            available: status.exists,
        });
    }

    // Hint follows catalog order, same as the status list.
    let allowed_filenames = rows.iter().map(|row| row.filename.clone()).collect();

    let template = DashboardTemplate::new(
        LayoutContext::from_state(&state, "Dashboard"),
        rows,
        allowed_filenames,
        display_size(state.upload_validator().max_bytes()),
    )
    .with_flash(dashboard_flash(&query));

    HtmlTemplate::new(template).into_response()
}

/// POST /admin/logout: drop the session unconditionally.
pub async fn logout_handler(session: Session) -> Response {
    if let Err(err) = destroy(&session).await {
        error!(target: "sessions", %err, "failed to destroy session on logout");
    } else {
        info!(target: "auth", "admin session closed");
    }

    found(LOGIN_PATH)
}

fn dashboard_flash(query: &DashboardQueryParams) -> Option<FlashMessage> {
    if query.success.as_deref().is_some_and(|flag| !flag.is_empty()) {
        return Some(FlashMessage {
            is_error: false,
            message: "✅ Archivo subido correctamente.".to_string(),
        });
    }

    match query.error.as_deref() {
        Some("upload") => Some(FlashMessage {
            is_error: true,
            message: "❌ Error al subir. Verifica el nombre o tamaño del archivo.".to_string(),
        }),
        _ => None,
    }
}
