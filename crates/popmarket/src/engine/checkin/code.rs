use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::CodeStatus;

/// The currently valid entry code for a popup.
///
/// Rotation is a scheduled collaborator's job; this engine only reads the code and
/// its expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotatingCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

pub(crate) struct CodeScore {
    pub score: u8,
    pub status: CodeStatus,
}

/// Exact-match validation against the active rotating code. An expired code is
/// invalid regardless of its content.
pub(crate) fn score_code(
    submitted: Option<&str>,
    current: Option<&RotatingCode>,
    now: DateTime<Utc>,
) -> CodeScore {
    let Some(submitted) = submitted else {
        return CodeScore {
            score: 0,
            status: CodeStatus::NotSubmitted,
        };
    };

    let Some(current) = current else {
        return CodeScore {
            score: 0,
            status: CodeStatus::Unavailable,
        };
    };

    if now >= current.expires_at {
        return CodeScore {
            score: 0,
            status: CodeStatus::Expired,
        };
    }

    if submitted.trim() == current.code {
        CodeScore {
            score: 100,
            status: CodeStatus::Matched,
        }
    } else {
        CodeScore {
            score: 0,
            status: CodeStatus::Mismatched,
        }
    }
}
