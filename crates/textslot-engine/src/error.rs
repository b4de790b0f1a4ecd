/// Failures surfaced when loading or exporting a document.
///
/// Ordinary editing conditions (schema rejection, cancelled events, caret at
/// a document boundary) are reported through `bool`/`Option` returns instead.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown component: {0}")]
    UnknownComponent(String),
    #[error("No root component loaded")]
    MissingRoot,
}
