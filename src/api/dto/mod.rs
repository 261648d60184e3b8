//! Data Transfer Objects for REST request/response serialization.

pub mod generate_dto;
pub mod history_dto;

pub use generate_dto::*;
pub use history_dto::*;
