pub mod constants;
pub mod handlers;
pub mod router;
pub mod utils;

pub use router::build_router;
