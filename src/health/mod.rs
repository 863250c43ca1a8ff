pub mod handlers;

pub use handlers::liveness_handler;
