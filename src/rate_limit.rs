use std::{net::IpAddr, num::NonZeroU32, time::Duration};

use governor::{
    clock::{Clock, DefaultClock},
    state::keyed::DashMapStateStore,
    Quota, RateLimiter,
};
use thiserror::Error;

const LOGIN_ATTEMPTS_PER_MINUTE: NonZeroU32 = match NonZeroU32::new(10) {
    Some(burst) => burst,
    None => panic!("login burst must be non-zero"),
};

/// Rate limiter for admin login attempts per client IP.
pub struct LoginRateLimiter {
    ip_limiter: RateLimiter<IpAddr, DashMapStateStore<IpAddr>, DefaultClock>,
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self::with_quota(Quota::per_minute(LOGIN_ATTEMPTS_PER_MINUTE))
    }

    pub fn with_quota(quota: Quota) -> Self {
        Self {
            ip_limiter: RateLimiter::keyed(quota),
        }
    }

    pub fn check_ip(&self, ip: IpAddr) -> Result<(), RateLimitError> {
        match self.ip_limiter.check_key(&ip) {
            Ok(_) => {
                self.ip_limiter.retain_recent();
                Ok(())
            }
            Err(not_until) => {
                let wait = not_until.wait_time_from(DefaultClock::default().now());
                Err(RateLimitError::Ip(wait))
            }
        }
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Too many login attempts from this IP. Try again in {0:?}.")]
    Ip(Duration),
}

impl RateLimitError {
    pub fn retry_after(&self) -> Duration {
        match self {
            RateLimitError::Ip(duration) => *duration,
        }
    }
}
