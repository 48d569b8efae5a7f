//! Multi-factor attendance verification: GPS proximity, rotating entry code, and
//! an optional receipt factor, combined into a single pass/fail verdict per visit.
//!
//! Each verification attempt emits one immutable [`domain::CheckinRecord`]; retries
//! create new records. Reward unlocking and loyalty aggregates are collaborator
//! concerns fed by the emitted result.

mod code;
pub mod config;
pub mod domain;
mod evaluator;
pub mod repository;
pub mod router;
pub mod service;

mod geo;

#[cfg(test)]
mod tests;

pub use code::RotatingCode;
pub use config::CheckinConfig;
pub use domain::{
    CheckinError, CheckinId, CheckinRecord, CheckinRequest, CheckinResult, CodeStatus, GeoPoint,
    PopupId, PopupSite, ScoreBreakdown,
};
pub use evaluator::CheckinEvaluator;
pub use repository::{
    CheckinRepository, CheckinStoreError, CodeSource, CodeSourceError, DirectoryError,
    PopupDirectory,
};
pub use router::checkin_router;
pub use service::CheckinService;
