pub mod handlers;
pub mod routes;
pub mod sse;
pub mod translate;
pub mod types;

pub use routes::build_router;
