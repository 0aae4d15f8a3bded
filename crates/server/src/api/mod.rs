pub mod error;
pub mod handlers;
pub mod middleware;
pub mod resize;
pub mod routes;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
