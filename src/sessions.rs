use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use time::{Duration, OffsetDateTime};
use tower_sessions::{cookie::Key, session::Error as SessionError, Expiry, Session};

pub const SESSION_ADMIN_KEY: &str = "auth.admin";

/// Privilege elevation stored in a browser session after a successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub is_admin: bool,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl AdminSession {
    /// A fresh admin grant valid for `ttl` from `now`. The lifetime is absolute and
    /// is never extended by activity.
    pub fn issue(now: OffsetDateTime, ttl: Duration) -> Self {
        Self {
            is_admin: true,
            issued_at: now.unix_timestamp(),
            expires_at: (now + ttl).unix_timestamp(),
        }
    }

    pub fn expires_at(&self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(self.expires_at).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }

    pub fn grants_admin(&self, now: OffsetDateTime) -> bool {
        self.is_admin && now.unix_timestamp() < self.expires_at
    }
}

/// Capability check composed in front of every protected handler.
pub fn grants_admin(state: Option<&AdminSession>, now: OffsetDateTime) -> bool {
    state.is_some_and(|admin| admin.grants_admin(now))
}

/// Elevate the session to admin, rotating its identifier and pinning its expiry.
pub async fn establish_admin(session: &Session, ttl: Duration) -> Result<AdminSession, SessionError> {
    session.cycle_id().await?;

    let admin = AdminSession::issue(OffsetDateTime::now_utc(), ttl);
    session.insert(SESSION_ADMIN_KEY, admin).await?;
    session.set_expiry(Some(Expiry::AtDateTime(admin.expires_at())));

    Ok(admin)
}

pub async fn current_admin(session: &Session) -> Result<Option<AdminSession>, SessionError> {
    session.get(SESSION_ADMIN_KEY).await
}

/// Drop every value in the session and delete it from the store.
pub async fn destroy(session: &Session) -> Result<(), SessionError> {
    session.flush().await
}

/// Cookie-signing key. A configured secret is stretched to the 64 bytes the signer
/// needs; without one a random key is generated and sessions end with the process.
pub fn session_key(secret: Option<&[u8]>) -> Key {
    match secret {
        Some(secret) => Key::from(Sha512::digest(secret).as_slice()),
        None => Key::generate(),
    }
}
