use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::engine::checkin::repository::{
    CheckinRepository, CheckinStoreError, CodeSource, CodeSourceError, DirectoryError,
    PopupDirectory,
};
use crate::engine::checkin::{
    CheckinEvaluator, CheckinId, CheckinRecord, CheckinRequest, CheckinService, GeoPoint, PopupId,
    PopupSite, RotatingCode,
};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn site() -> PopupSite {
    PopupSite {
        id: PopupId("pop-seongsu".to_string()),
        name: "Seongsu Garage Pop-up".to_string(),
        location: GeoPoint {
            latitude: 37.5446,
            longitude: 127.0559,
        },
    }
}

/// A point offset due north of the popup site by roughly `meters`.
pub(super) fn point_north_m(meters: f64) -> GeoPoint {
    let base = site().location;
    GeoPoint {
        latitude: base.latitude + meters / 111_320.0,
        longitude: base.longitude,
    }
}

pub(super) fn valid_code() -> RotatingCode {
    RotatingCode {
        code: "QR-7F3K".to_string(),
        expires_at: now() + Duration::minutes(5),
    }
}

pub(super) fn expired_code() -> RotatingCode {
    RotatingCode {
        code: "QR-7F3K".to_string(),
        expires_at: now() - Duration::minutes(1),
    }
}

pub(super) fn request(location: Option<GeoPoint>, code: Option<&str>) -> CheckinRequest {
    CheckinRequest {
        popup_id: site().id,
        visitor_id: "user-301".to_string(),
        location,
        accuracy_m: Some(10.0),
        submitted_code: code.map(str::to_string),
        receipt_text: None,
    }
}

pub(super) fn build_service(
    code: Option<RotatingCode>,
) -> (
    CheckinService<StaticPopupDirectory, FixedCodeSource, MemoryCheckinRepository>,
    Arc<MemoryCheckinRepository>,
) {
    let mut sites = HashMap::new();
    sites.insert(site().id, site());

    let repository = Arc::new(MemoryCheckinRepository::default());
    let service = CheckinService::new(
        Arc::new(StaticPopupDirectory { sites }),
        Arc::new(FixedCodeSource { code }),
        repository.clone(),
        CheckinEvaluator::default(),
    );
    (service, repository)
}

pub(super) struct StaticPopupDirectory {
    pub(super) sites: HashMap<PopupId, PopupSite>,
}

impl PopupDirectory for StaticPopupDirectory {
    fn find(&self, id: &PopupId) -> Result<Option<PopupSite>, DirectoryError> {
        Ok(self.sites.get(id).cloned())
    }
}

pub(super) struct FixedCodeSource {
    pub(super) code: Option<RotatingCode>,
}

impl CodeSource for FixedCodeSource {
    fn current_code(&self, _popup_id: &PopupId) -> Result<Option<RotatingCode>, CodeSourceError> {
        Ok(self.code.clone())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryCheckinRepository {
    records: Arc<Mutex<HashMap<CheckinId, CheckinRecord>>>,
}

impl MemoryCheckinRepository {
    pub(super) fn records(&self) -> Vec<CheckinRecord> {
        self.records
            .lock()
            .expect("record mutex poisoned")
            .values()
            .cloned()
            .collect()
    }
}

impl CheckinRepository for MemoryCheckinRepository {
    fn append(&self, record: CheckinRecord) -> Result<CheckinRecord, CheckinStoreError> {
        let mut guard = self.records.lock().expect("record mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(CheckinStoreError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &CheckinId) -> Result<Option<CheckinRecord>, CheckinStoreError> {
        let guard = self.records.lock().expect("record mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

pub(super) struct UnavailableCheckinStore;

impl CheckinRepository for UnavailableCheckinStore {
    fn append(&self, _record: CheckinRecord) -> Result<CheckinRecord, CheckinStoreError> {
        Err(CheckinStoreError::Unavailable("store offline".to_string()))
    }

    fn fetch(&self, _id: &CheckinId) -> Result<Option<CheckinRecord>, CheckinStoreError> {
        Err(CheckinStoreError::Unavailable("store offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
