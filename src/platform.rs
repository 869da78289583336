use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Operating-system family of a client, used as the catalog lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformTag {
    Windows,
    Macos,
    Linux,
    Android,
    Ios,
    Unknown,
}

const IOS_DEVICE_TOKENS: [&str; 3] = ["iphone", "ipad", "ipod"];
const MACOS_TOKENS: [&str; 3] = ["macintosh", "mac os x", "macos"];

impl PlatformTag {
    /// Every tag that can carry a catalog entry, in display order.
    pub const KNOWN: [PlatformTag; 5] = [
        PlatformTag::Windows,
        PlatformTag::Macos,
        PlatformTag::Linux,
        PlatformTag::Android,
        PlatformTag::Ios,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformTag::Windows => "windows",
            PlatformTag::Macos => "macos",
            PlatformTag::Linux => "linux",
            PlatformTag::Android => "android",
            PlatformTag::Ios => "ios",
            PlatformTag::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized platform: {0}")]
pub struct ParsePlatformError(pub String);

impl FromStr for PlatformTag {
    type Err = ParsePlatformError;

    /// Parse a tag case-insensitively. `unknown` is accepted since it is a valid tag,
    /// it simply never has a catalog entry. Surrounding whitespace is not stripped.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "windows" => Ok(PlatformTag::Windows),
            "macos" => Ok(PlatformTag::Macos),
            "linux" => Ok(PlatformTag::Linux),
            "android" => Ok(PlatformTag::Android),
            "ios" => Ok(PlatformTag::Ios),
            "unknown" => Ok(PlatformTag::Unknown),
            _ => Err(ParsePlatformError(raw.to_string())),
        }
    }
}

/// Infer the client platform from a raw `User-Agent` header value.
///
/// Tokens are checked in a fixed order and the first match wins: Windows, macOS,
/// Linux (unless the agent also names Android), Android, iOS. Anything else is
/// [`PlatformTag::Unknown`].
pub fn detect_platform(user_agent: &str) -> PlatformTag {
    let ua = user_agent.to_lowercase();
    let has_ios_device = IOS_DEVICE_TOKENS.iter().any(|token| ua.contains(token));

    if ua.contains("windows") {
        return PlatformTag::Windows;
    }
    // iOS agents advertise themselves "like Mac OS X".
    if !has_ios_device && MACOS_TOKENS.iter().any(|token| ua.contains(token)) {
        return PlatformTag::Macos;
    }
    if ua.contains("linux") && !ua.contains("android") {
        return PlatformTag::Linux;
    }
    if ua.contains("android") {
        return PlatformTag::Android;
    }
    if has_ios_device {
        return PlatformTag::Ios;
    }

    PlatformTag::Unknown
}
