use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::domain::{
    CheckinError, CheckinId, CheckinRecord, CheckinRequest, CheckinResult,
};
use super::evaluator::CheckinEvaluator;
use super::repository::{CheckinRepository, CodeSource, PopupDirectory};

static CHECKIN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_checkin_id() -> CheckinId {
    let id = CHECKIN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CheckinId(format!("chk-{id:06}"))
}

/// Service composing the popup directory, code source, scorer, and record store.
pub struct CheckinService<D, C, R> {
    directory: Arc<D>,
    codes: Arc<C>,
    repository: Arc<R>,
    evaluator: Arc<CheckinEvaluator>,
}

impl<D, C, R> CheckinService<D, C, R>
where
    D: PopupDirectory + 'static,
    C: CodeSource + 'static,
    R: CheckinRepository + 'static,
{
    pub fn new(
        directory: Arc<D>,
        codes: Arc<C>,
        repository: Arc<R>,
        evaluator: CheckinEvaluator,
    ) -> Self {
        Self {
            directory,
            codes,
            repository,
            evaluator: Arc::new(evaluator),
        }
    }

    /// Verify one visit attempt and persist its record.
    ///
    /// Identical inputs may legitimately be submitted again while a code is still
    /// valid; every call emits an independent record.
    pub fn submit(
        &self,
        request: CheckinRequest,
        now: DateTime<Utc>,
    ) -> Result<CheckinResult, CheckinError> {
        if let Some(location) = &request.location {
            if !location.is_valid() {
                return Err(CheckinError::InvalidCoordinates {
                    latitude: location.latitude,
                    longitude: location.longitude,
                });
            }
        }
        if let Some(accuracy) = request.accuracy_m {
            if !accuracy.is_finite() || accuracy < 0.0 {
                return Err(CheckinError::InvalidAccuracy(accuracy));
            }
        }

        let site = self
            .directory
            .find(&request.popup_id)?
            .ok_or_else(|| CheckinError::PopupNotFound(request.popup_id.0.clone()))?;

        let current_code = self.codes.current_code(&site.id)?;

        let evaluation = self.evaluator.evaluate(
            &site.location,
            request.location.as_ref(),
            request.accuracy_m,
            request.submitted_code.as_deref(),
            current_code.as_ref(),
            request.receipt_text.as_deref(),
            now,
        );

        let record = CheckinRecord {
            id: next_checkin_id(),
            popup_id: site.id,
            visitor_id: request.visitor_id,
            gps_score: evaluation.gps_score,
            qr_score: evaluation.qr_score,
            receipt_score: evaluation.receipt_score,
            total_score: evaluation.total_score,
            passed: evaluation.passed,
            distance_m: evaluation.distance_m,
            accuracy_m: request.accuracy_m,
            code_status: evaluation.code_status,
            recorded_at: now,
        };

        let stored = self.repository.append(record)?;

        tracing::debug!(
            popup = %stored.popup_id.0,
            total = stored.total_score,
            passed = stored.passed,
            "check-in evaluated"
        );

        Ok(CheckinResult {
            record_id: stored.id,
            passed: stored.passed,
            total_score: stored.total_score,
            breakdown: evaluation.breakdown,
            code_status: stored.code_status,
        })
    }

    /// Fetch a stored record for API responses.
    pub fn get(&self, id: &CheckinId) -> Result<Option<CheckinRecord>, CheckinError> {
        Ok(self.repository.fetch(id)?)
    }
}
