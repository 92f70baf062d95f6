// src/api/mod.rs
// HTTP-facing API types

pub mod error;

pub use error::{ApiError, ApiResult};
