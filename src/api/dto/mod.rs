//! Data Transfer Objects for REST request/response serialization.
//!
//! Bodies use camelCase field names, matching the entity wire shape.

pub mod feed_dto;

pub use feed_dto::*;
