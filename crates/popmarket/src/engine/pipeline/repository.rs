use super::domain::{Pipeline, PipelineId};

/// Storage seam for pipelines. The stored record is the single source of truth;
/// writes are compare-and-set on the version so two concurrent actions cannot both
/// land on the same snapshot.
pub trait PipelineRepository: Send + Sync {
    fn insert(&self, pipeline: Pipeline) -> Result<Pipeline, PipelineStoreError>;
    fn fetch(&self, id: &PipelineId) -> Result<Option<Pipeline>, PipelineStoreError>;
    /// Persists `pipeline` only if the stored version still equals
    /// `expected_version`; the stored version is then advanced by one.
    fn update(
        &self,
        pipeline: Pipeline,
        expected_version: u64,
    ) -> Result<Pipeline, PipelineStoreError>;
    fn list(&self) -> Result<Vec<Pipeline>, PipelineStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineStoreError {
    #[error("pipeline already exists")]
    AlreadyExists,
    #[error("pipeline not found")]
    NotFound,
    #[error("version conflict: expected {expected}, found {found}")]
    VersionConflict { expected: u64, found: u64 },
    #[error("pipeline store unavailable: {0}")]
    Unavailable(String),
}
