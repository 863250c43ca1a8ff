//! Movie catalogue and its HTTP handlers

pub mod catalog;
pub mod handlers;

pub use catalog::*;
pub use handlers::*;
