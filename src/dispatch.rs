use std::path::PathBuf;

use crate::catalog::DownloadCatalog;
use crate::platform::PlatformTag;

/// What a download request for a given platform resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No catalog entry exists for the platform.
    Unrecognized,
    /// The platform is fulfilled by an external store.
    Redirect(String),
    /// The entry has neither a local file nor a store URL.
    NotFound,
    /// Transfer a local file. Existence is checked when the file is opened.
    Serve {
        path: PathBuf,
        download_name: String,
    },
}

/// Decide how to fulfil a download without touching the filesystem.
pub fn resolve(catalog: &DownloadCatalog, platform: PlatformTag) -> DispatchOutcome {
    let Some(descriptor) = catalog.describe(platform) else {
        return DispatchOutcome::Unrecognized;
    };

    if let Some(url) = descriptor.store_url.as_deref() {
        return DispatchOutcome::Redirect(url.to_string());
    }

    match (descriptor.filename.as_deref(), catalog.path_for(descriptor)) {
        (Some(filename), Some(path)) => DispatchOutcome::Serve {
            path,
            download_name: filename.to_string(),
        },
        _ => DispatchOutcome::NotFound,
    }
}
