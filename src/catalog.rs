use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::platform::PlatformTag;

/// Placeholder shown when a file size cannot be determined.
pub const SIZE_UNAVAILABLE: &str = "–";

pub const DEFAULT_IOS_STORE_URL: &str = "https://apps.apple.com";

/// Static description of how a download is fulfilled for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub platform: PlatformTag,
    pub filename: Option<String>,
    pub label: String,
    pub icon: String,
    pub store_url: Option<String>,
}

impl FileDescriptor {
    fn local(platform: PlatformTag, filename: &str, label: &str, icon: &str) -> Self {
        Self {
            platform,
            filename: Some(filename.to_string()),
            label: label.to_string(),
            icon: icon.to_string(),
            store_url: None,
        }
    }

    fn store(platform: PlatformTag, label: &str, icon: &str, store_url: String) -> Self {
        Self {
            platform,
            filename: None,
            label: label.to_string(),
            icon: icon.to_string(),
            store_url: Some(store_url),
        }
    }
}

/// Live status of a catalog entry's backing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntryStatus {
    pub exists: bool,
    pub size_display: String,
}

impl CatalogEntryStatus {
    fn unavailable() -> Self {
        Self {
            exists: false,
            size_display: SIZE_UNAVAILABLE.to_string(),
        }
    }
}

/// Immutable registry of installers, backed by files in a single storage directory.
#[derive(Debug, Clone)]
pub struct DownloadCatalog {
    root: PathBuf,
    descriptors: Vec<FileDescriptor>,
    allowed_filenames: BTreeSet<String>,
}

impl DownloadCatalog {
    /// The remote-support installer set, stored under `root`.
    pub fn standard(root: impl Into<PathBuf>, ios_store_url: impl Into<String>) -> Self {
        Self::with_descriptors(
            root,
            vec![
                FileDescriptor::local(
                    PlatformTag::Windows,
                    "soporte-remoto-windows.exe",
                    "Windows",
                    "🪟",
                ),
                FileDescriptor::local(
                    PlatformTag::Macos,
                    "soporte-remoto-macos.dmg",
                    "macOS",
                    "🍎",
                ),
                FileDescriptor::local(
                    PlatformTag::Linux,
                    "soporte-remoto-linux.sh",
                    "Linux",
                    "🐧",
                ),
                FileDescriptor::local(
                    PlatformTag::Android,
                    "soporte-remoto-android.apk",
                    "Android",
                    "🤖",
                ),
                FileDescriptor::store(PlatformTag::Ios, "iOS", "📱", ios_store_url.into()),
            ],
        )
    }

    pub fn with_descriptors(root: impl Into<PathBuf>, descriptors: Vec<FileDescriptor>) -> Self {
        let allowed_filenames = descriptors
            .iter()
            .filter_map(|descriptor| descriptor.filename.clone())
            .collect();

        Self {
            root: root.into(),
            descriptors,
            allowed_filenames,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up the descriptor for a platform; `None` for tags without an entry.
    pub fn describe(&self, platform: PlatformTag) -> Option<&FileDescriptor> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.platform == platform)
    }

    pub fn list_all(&self) -> &[FileDescriptor] {
        &self.descriptors
    }

    /// Descriptors that are fulfilled from a local file.
    pub fn local_files(&self) -> impl Iterator<Item = (&FileDescriptor, &str)> {
        self.descriptors.iter().filter_map(|descriptor| {
            descriptor
                .filename
                .as_deref()
                .map(|filename| (descriptor, filename))
        })
    }

    /// The only filenames an upload may ever produce.
    pub fn allowed_filenames(&self) -> &BTreeSet<String> {
        &self.allowed_filenames
    }

    pub fn path_for(&self, descriptor: &FileDescriptor) -> Option<PathBuf> {
        descriptor
            .filename
            .as_deref()
            .map(|filename| self.root.join(filename))
    }

    /// Stat the backing file. Any I/O failure reports the entry as unavailable.
    pub async fn status(&self, descriptor: &FileDescriptor) -> CatalogEntryStatus {
        let Some(path) = self.path_for(descriptor) else {
            return CatalogEntryStatus::unavailable();
        };

        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => CatalogEntryStatus {
                exists: true,
                size_display: display_size(metadata.len()),
            },
            Ok(_) => CatalogEntryStatus::unavailable(),
            Err(err) => {
                debug!(
                    target: "catalog",
                    %err,
                    path = %path.display(),
                    "catalog file not available"
                );
                CatalogEntryStatus::unavailable()
            }
        }
    }
}

/// Format a byte count as `B`, `KB` or `MB` with one decimal.
pub fn display_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * KIB;

    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}
