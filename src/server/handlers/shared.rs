use axum::response::Response;
use time::OffsetDateTime;
use tower_sessions::Session;
use tracing::{debug, error};

use crate::sessions::{current_admin, grants_admin, AdminSession};

use crate::server::utils::found;

pub const LOGIN_PATH: &str = "/admin";
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

/// Ensure the current session holds a live admin grant, redirecting to the login
/// page otherwise. Session store failures are treated as anonymous.
pub async fn require_admin(session: &Session) -> Result<AdminSession, Response> {
    let admin = match current_admin(session).await {
        Ok(admin) => admin,
        Err(err) => {
            error!(
                target: "sessions",
                %err,
                "failed to read session while enforcing admin access"
            );
            None
        }
    };

    match admin {
        Some(admin) if grants_admin(Some(&admin), OffsetDateTime::now_utc()) => Ok(admin),
        Some(admin) => {
            debug!(
                target: "sessions",
                expires_at = admin.expires_at,
                "expired admin session rejected"
            );
            Err(found(LOGIN_PATH))
        }
        None => Err(found(LOGIN_PATH)),
    }
}
