pub mod api;
pub mod core;
pub mod engine;
pub mod generators;
pub mod models;
pub mod pptx;

// Re-export commonly used types
pub use crate::core::{EngineError, EngineResult};
pub use crate::engine::DocumentEngine;
pub use crate::models::{DocumentKind, DocumentRequest, GenerationResult};
