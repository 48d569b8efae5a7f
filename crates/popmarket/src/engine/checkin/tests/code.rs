use super::common::*;
use crate::engine::checkin::code::score_code;
use crate::engine::checkin::CodeStatus;

#[test]
fn exact_match_scores_full_marks() {
    let current = valid_code();
    let score = score_code(Some("QR-7F3K"), Some(&current), now());

    assert_eq!(score.score, 100);
    assert_eq!(score.status, CodeStatus::Matched);
}

#[test]
fn submitted_code_is_trimmed_before_matching() {
    let current = valid_code();
    let score = score_code(Some("  QR-7F3K \n"), Some(&current), now());

    assert_eq!(score.status, CodeStatus::Matched);
}

#[test]
fn expired_code_is_invalid_even_when_matching() {
    let current = expired_code();
    let score = score_code(Some("QR-7F3K"), Some(&current), now());

    assert_eq!(score.score, 0);
    assert_eq!(score.status, CodeStatus::Expired);
}

#[test]
fn mismatch_scores_zero() {
    let current = valid_code();
    let score = score_code(Some("QR-XXXX"), Some(&current), now());

    assert_eq!(score.score, 0);
    assert_eq!(score.status, CodeStatus::Mismatched);
}

#[test]
fn missing_submission_is_not_submitted() {
    let current = valid_code();
    let score = score_code(None, Some(&current), now());

    assert_eq!(score.status, CodeStatus::NotSubmitted);
}

#[test]
fn no_active_code_is_unavailable() {
    let score = score_code(Some("QR-7F3K"), None, now());

    assert_eq!(score.status, CodeStatus::Unavailable);
}
