use crate::{
    catalog::DownloadCatalog, client_ip::TrustedProxies, config::AppConfig,
    rate_limit::LoginRateLimiter, uploads::UploadValidator,
};
use std::sync::Arc;
use tracing::warn;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Installer registry, fixed for the lifetime of the process
    pub catalog: Arc<DownloadCatalog>,
    /// Filename whitelist and size ceiling for admin uploads
    pub upload_validator: Arc<UploadValidator>,
    /// Shared login rate limiter
    pub login_rate_limiter: Arc<LoginRateLimiter>,
    /// Proxies allowed to report the client address
    pub trusted_proxies: Arc<TrustedProxies>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let catalog = DownloadCatalog::standard(
            config.storage.root.clone(),
            config.catalog.ios_store_url.clone(),
        );
        let upload_validator =
            UploadValidator::for_catalog(&catalog, config.storage.max_upload_bytes);
        let trusted_proxies = TrustedProxies::parse(&config.security.trusted_proxies)
            .unwrap_or_else(|err| {
                warn!(%err, "ignoring trusted proxy list; forwarded addresses will not be used");
                TrustedProxies::default()
            });

        Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            upload_validator: Arc::new(upload_validator),
            login_rate_limiter: Arc::new(LoginRateLimiter::new()),
            trusted_proxies: Arc::new(trusted_proxies),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn catalog(&self) -> &DownloadCatalog {
        &self.catalog
    }

    pub fn upload_validator(&self) -> &UploadValidator {
        &self.upload_validator
    }

    pub fn login_rate_limiter(&self) -> &LoginRateLimiter {
        &self.login_rate_limiter
    }

    pub fn trusted_proxies(&self) -> &TrustedProxies {
        &self.trusted_proxies
    }

    /// Configured administrator secret; `None` disables the admin panel.
    pub fn admin_password(&self) -> Option<&str> {
        self.config.security.admin_password.as_deref()
    }

    pub fn session_ttl(&self) -> time::Duration {
        time::Duration::hours(self.config.session.max_age_hours as i64)
    }
}
