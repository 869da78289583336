use std::time::Duration;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Compare a submitted password with the configured administrator secret.
///
/// Both values are reduced to fixed-length SHA-256 digests before a constant-time
/// comparison, so response timing reveals neither the secret's length nor how many
/// leading characters matched. With no secret configured every attempt fails.
pub fn verify_admin_secret(supplied: &str, configured: Option<&str>) -> bool {
    let Some(configured) = configured.filter(|secret| !secret.is_empty()) else {
        return false;
    };

    let supplied_digest = Sha256::digest(supplied.as_bytes());
    let configured_digest = Sha256::digest(configured.as_bytes());

    supplied_digest
        .as_slice()
        .ct_eq(configured_digest.as_slice())
        .into()
}

/// Introduce a small random backoff when login fails to slow brute-force attempts.
pub async fn randomized_backoff() {
    let base_delay = Duration::from_millis(150);
    let jitter = Duration::from_millis(fastrand::u64(0..150));
    tokio::time::sleep(base_delay + jitter).await;
}
