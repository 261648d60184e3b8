//! Domain layer: generation records, history, model catalog and prompts.
//!
//! This module holds the server-side model: the identity and content of a
//! generation, the capped in-memory history log, the set of models clients
//! may pick from, and the built-in prompt library.

pub mod generation_id;
pub mod generation_record;
pub mod history_store;
pub mod model_catalog;
pub mod prompt_library;

pub use generation_id::GenerationId;
pub use generation_record::GenerationRecord;
pub use history_store::HistoryStore;
pub use model_catalog::ModelCatalog;
