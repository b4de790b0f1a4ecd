pub mod components;
pub mod editing;
pub mod error;
pub mod formatters;
pub mod models;

// Re-export key types for easier usage
pub use editing::{
    Commander, Document, Editor, EditorOptions, Keyboard, Query, QueryState, Selection,
    Translator,
};
pub use error::EngineError;
pub use formatters::FormatterList;
pub use models::*;
