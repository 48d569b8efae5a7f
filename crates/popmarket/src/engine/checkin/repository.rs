use super::code::RotatingCode;
use super::domain::{CheckinId, CheckinRecord, PopupId, PopupSite};

/// Popup site lookup seam supplied by the persistence collaborator.
pub trait PopupDirectory: Send + Sync {
    fn find(&self, id: &PopupId) -> Result<Option<PopupSite>, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("popup directory unavailable: {0}")]
    Unavailable(String),
}

/// Read-only view of the rotating entry code. Rotation happens elsewhere on a
/// schedule; this engine never writes codes.
pub trait CodeSource: Send + Sync {
    fn current_code(&self, popup_id: &PopupId) -> Result<Option<RotatingCode>, CodeSourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CodeSourceError {
    #[error("code source unavailable: {0}")]
    Unavailable(String),
}

/// Append-only store for emitted check-in records.
pub trait CheckinRepository: Send + Sync {
    fn append(&self, record: CheckinRecord) -> Result<CheckinRecord, CheckinStoreError>;
    fn fetch(&self, id: &CheckinId) -> Result<Option<CheckinRecord>, CheckinStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CheckinStoreError {
    #[error("record already exists")]
    Conflict,
    #[error("check-in store unavailable: {0}")]
    Unavailable(String),
}
