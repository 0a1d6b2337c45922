use thiserror::Error;

/// Failure taxonomy for one analysis or stance run.
///
/// Per-source collection failures are recovered inside the collector (a failed
/// source contributes zero items); everything surfaced here is fatal for the
/// request that triggered it.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("collection failed: {0}")]
    Collection(String),

    #[error("no opinions survived cleaning and deduplication; try a broader topic")]
    EmptyInput,

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("grouping failed: {0}")]
    Grouping(String),

    #[error("projection failed: {0}")]
    Projection(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
