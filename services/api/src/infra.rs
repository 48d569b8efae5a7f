use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;

use popmarket::engine::cache::InMemoryTtlCache;
use popmarket::engine::checkin::{
    CheckinId, CheckinRecord, CheckinRepository, CheckinStoreError, CodeSource, CodeSourceError,
    DirectoryError, GeoPoint, PopupDirectory, PopupId, PopupSite, RotatingCode,
};
use popmarket::engine::fraud::MarketComparable;
use popmarket::engine::pipeline::{
    Pipeline, PipelineId, PipelineRepository, PipelineStoreError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) comparables_cache: Arc<InMemoryTtlCache<Vec<MarketComparable>>>,
}

pub(crate) fn comparables_cache() -> Arc<InMemoryTtlCache<Vec<MarketComparable>>> {
    Arc::new(InMemoryTtlCache::new(Duration::minutes(15)))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPipelineRepository {
    pipelines: Arc<Mutex<HashMap<PipelineId, Pipeline>>>,
}

impl PipelineRepository for InMemoryPipelineRepository {
    fn insert(&self, pipeline: Pipeline) -> Result<Pipeline, PipelineStoreError> {
        let mut guard = self.pipelines.lock().expect("pipeline mutex poisoned");
        if guard.contains_key(&pipeline.id) {
            return Err(PipelineStoreError::AlreadyExists);
        }
        guard.insert(pipeline.id.clone(), pipeline.clone());
        Ok(pipeline)
    }

    fn fetch(&self, id: &PipelineId) -> Result<Option<Pipeline>, PipelineStoreError> {
        let guard = self.pipelines.lock().expect("pipeline mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update(
        &self,
        mut pipeline: Pipeline,
        expected_version: u64,
    ) -> Result<Pipeline, PipelineStoreError> {
        let mut guard = self.pipelines.lock().expect("pipeline mutex poisoned");
        let stored = guard
            .get(&pipeline.id)
            .ok_or(PipelineStoreError::NotFound)?;
        if stored.version != expected_version {
            return Err(PipelineStoreError::VersionConflict {
                expected: expected_version,
                found: stored.version,
            });
        }
        pipeline.version = expected_version + 1;
        guard.insert(pipeline.id.clone(), pipeline.clone());
        Ok(pipeline)
    }

    fn list(&self) -> Result<Vec<Pipeline>, PipelineStoreError> {
        let guard = self.pipelines.lock().expect("pipeline mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCheckinRepository {
    records: Arc<Mutex<HashMap<CheckinId, CheckinRecord>>>,
}

impl CheckinRepository for InMemoryCheckinRepository {
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

/// Popup lookup backed by a static seed until the persistence collaborator lands.
#[derive(Clone)]
pub(crate) struct SeededPopupDirectory {
    sites: Arc<HashMap<PopupId, PopupSite>>,
}

impl SeededPopupDirectory {
    pub(crate) fn with_demo_sites() -> Self {
        let mut sites = HashMap::new();
        let seongsu = PopupSite {
            id: PopupId("pop-seongsu".to_string()),
            name: "Seongsu Garage Pop-up".to_string(),
            location: GeoPoint {
                latitude: 37.5446,
                longitude: 127.0559,
            },
        };
        sites.insert(seongsu.id.clone(), seongsu);
        Self {
            sites: Arc::new(sites),
        }
    }
}

impl PopupDirectory for SeededPopupDirectory {
    fn find(&self, id: &PopupId) -> Result<Option<PopupSite>, DirectoryError> {
        Ok(self.sites.get(id).cloned())
    }
}

/// Code store written by the external rotation scheduler; this service only reads.
#[derive(Default, Clone)]
pub(crate) struct RotatingCodeStore {
    codes: Arc<Mutex<HashMap<PopupId, RotatingCode>>>,
}

impl RotatingCodeStore {
    pub(crate) fn seed_demo_code(&self) {
        let mut guard = self.codes.lock().expect("code mutex poisoned");
        guard.insert(
            PopupId("pop-seongsu".to_string()),
            RotatingCode {
                code: "QR-7F3K".to_string(),
                expires_at: Utc::now() + Duration::minutes(10),
            },
        );
    }
}

impl CodeSource for RotatingCodeStore {
    fn current_code(&self, popup_id: &PopupId) -> Result<Option<RotatingCode>, CodeSourceError> {
        let guard = self.codes.lock().expect("code mutex poisoned");
        Ok(guard.get(popup_id).cloned())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
