//! Service layer: business logic orchestration.
//!
//! [`GenerationService`] validates generation requests, calls the upstream
//! completion client, extracts markup and records history.

pub mod generation_service;

pub use generation_service::{GenerateParams, GenerationService};
