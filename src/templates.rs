use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use time::OffsetDateTime;
use tracing::error;

use crate::app_state::AppState;

/// Shared layout context injected into all templates
#[derive(Clone, Debug)]
pub struct LayoutContext {
    pub title: String,
    pub brand_name: String,
    pub current_year: i32,
}

impl LayoutContext {
    /// Build a layout context using the configured brand name
    pub fn from_state(state: &AppState, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            brand_name: state.config().ui.brand_name.clone(),
            current_year: OffsetDateTime::now_utc().year(),
        }
    }
}

/// Wrapper that converts Askama templates into Axum responses with logging
pub struct HtmlTemplate<T: Template> {
    template: T,
}

impl<T: Template> HtmlTemplate<T> {
    pub fn new(template: T) -> Self {
        Self { template }
    }
}

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.template.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                error!(target: "templates", error = %err, "failed to render template");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Template rendering error",
                )
                    .into_response()
            }
        }
    }
}

#[derive(Template)]
#[template(path = "login.html", escape = "html")]
pub struct LoginTemplate {
    pub layout: LayoutContext,
    pub show_error: bool,
}

impl LoginTemplate {
    pub fn new(layout: LayoutContext) -> Self {
        Self {
            layout,
            show_error: false,
        }
    }

    pub fn with_error(mut self, show_error: bool) -> Self {
        self.show_error = show_error;
        self
    }
}

/// Outcome banner rendered at the top of the dashboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlashMessage {
    pub is_error: bool,
    pub message: String,
}

/// One installer row in the dashboard status list.
#[derive(Clone, Debug)]
pub struct DashboardRow {
    pub icon: String,
    pub label: String,
    pub filename: String,
    pub size_display: String,
    pub available: bool,
}

#[derive(Template)]
#[template(path = "dashboard.html", escape = "html")]
pub struct DashboardTemplate {
    pub layout: LayoutContext,
    pub flash: Option<FlashMessage>,
    pub rows: Vec<DashboardRow>,
    pub allowed_filenames: Vec<String>,
    pub max_upload_display: String,
}

impl DashboardTemplate {
    pub fn new(
        layout: LayoutContext,
        rows: Vec<DashboardRow>,
        allowed_filenames: Vec<String>,
        max_upload_display: String,
    ) -> Self {
        Self {
            layout,
            flash: None,
            rows,
            allowed_filenames,
            max_upload_display,
        }
    }

    pub fn with_flash(mut self, flash: Option<FlashMessage>) -> Self {
        self.flash = flash;
        self
    }
}
