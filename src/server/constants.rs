pub const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;
pub const MIN_MAX_UPLOAD_BYTES: u64 = 1024 * 1024;
pub const MAX_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024 * 1024;
pub const MIN_SESSION_SECRET_BYTES: usize = 32;
pub const MAX_SESSION_AGE_HOURS: u64 = 24;
pub const UPLOAD_FIELD_NAME: &str = "file";
