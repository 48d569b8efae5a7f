//! Integration specifications for visit verification through the public facade and
//! HTTP router, covering the multi-factor scorer without reaching into private
//! modules.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::{Duration, Utc};

    use popmarket::engine::checkin::{
        CheckinEvaluator, CheckinId, CheckinRecord, CheckinRepository, CheckinService,
        CheckinStoreError, CodeSource, CodeSourceError, DirectoryError, GeoPoint, PopupDirectory,
        PopupId, PopupSite, RotatingCode,
    };

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

    pub(super) fn near_site(meters: f64) -> GeoPoint {
        let base = site().location;
        GeoPoint {
            latitude: base.latitude + meters / 111_320.0,
            longitude: base.longitude,
        }
    }

    pub(super) struct SeededDirectory;

    impl PopupDirectory for SeededDirectory {
        fn find(&self, id: &PopupId) -> Result<Option<PopupSite>, DirectoryError> {
            if *id == site().id {
                Ok(Some(site()))
            } else {
                Ok(None)
            }
        }
    }

    pub(super) struct LiveCodeSource {
        pub(super) expired: bool,
    }

    impl CodeSource for LiveCodeSource {
        fn current_code(&self, _id: &PopupId) -> Result<Option<RotatingCode>, CodeSourceError> {
            let offset = if self.expired {
                Duration::minutes(-1)
            } else {
                Duration::minutes(5)
            };
            Ok(Some(RotatingCode {
                code: "QR-7F3K".to_string(),
                expires_at: Utc::now() + offset,
            }))
        }
    }

    #[derive(Default, Clone)]
    pub(super) struct RecordStore {
        records: Arc<Mutex<HashMap<CheckinId, CheckinRecord>>>,
    }

    impl CheckinRepository for RecordStore {
        fn append(&self, record: CheckinRecord) -> Result<CheckinRecord, CheckinStoreError> {
            let mut guard = self.records.lock().expect("record mutex poisoned");
            guard.insert(record.id.clone(), record.clone());
            Ok(record)
        }

        fn fetch(&self, id: &CheckinId) -> Result<Option<CheckinRecord>, CheckinStoreError> {
            let guard = self.records.lock().expect("record mutex poisoned");
            Ok(guard.get(id).cloned())
        }
    }

    pub(super) fn service(
        expired: bool,
    ) -> Arc<CheckinService<SeededDirectory, LiveCodeSource, RecordStore>> {
        Arc::new(CheckinService::new(
            Arc::new(SeededDirectory),
            Arc::new(LiveCodeSource { expired }),
            Arc::new(RecordStore::default()),
            CheckinEvaluator::default(),
        ))
    }
}

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use popmarket::engine::checkin::checkin_router;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::*;

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 8192)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

fn checkin_request(payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/checkins")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request")
}

#[tokio::test]
async fn nearby_visit_with_valid_code_passes_over_http() {
    let router = checkin_router(service(false));
    let location = near_site(30.0);

    let payload = json!({
        "popup_id": "pop-seongsu",
        "visitor_id": "user-301",
        "location": { "latitude": location.latitude, "longitude": location.longitude },
        "accuracy_m": 10.0,
        "submitted_code": "QR-7F3K",
    });

    let response = router
        .clone()
        .oneshot(checkin_request(payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json(response).await;
    assert_eq!(body["passed"], true);
    assert_eq!(body["total_score"], 100);
    assert_eq!(body["breakdown"]["gps"], 60);
    assert_eq!(body["breakdown"]["qr"], 40);

    // The emitted record is retrievable through the same router.
    let record_id = body["record_id"].as_str().expect("record id").to_string();
    let fetch = Request::builder()
        .method("GET")
        .uri(format!("/api/v1/checkins/{record_id}"))
        .body(Body::empty())
        .expect("request");
    let response = router.oneshot(fetch).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let record = read_json(response).await;
    assert_eq!(record["passed"], true);
    assert_eq!(record["code_status"], "matched");
}

#[tokio::test]
async fn expired_code_fails_with_a_score_breakdown_and_allows_retry() {
    let router = checkin_router(service(true));

    let payload = json!({
        "popup_id": "pop-seongsu",
        "visitor_id": "user-301",
        "submitted_code": "QR-7F3K",
    });

    let first = router
        .clone()
        .oneshot(checkin_request(payload.clone()))
        .await
        .expect("response");
    assert_eq!(first.status(), StatusCode::CREATED);
    let body = read_json(first).await;
    assert_eq!(body["passed"], false);
    assert_eq!(body["code_status"], "expired");
    assert_eq!(body["breakdown"]["qr"], 0);

    // A failed attempt never blocks another try.
    let second = router
        .oneshot(checkin_request(payload))
        .await
        .expect("response");
    assert_eq!(second.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn malformed_coordinates_are_rejected_before_scoring() {
    let router = checkin_router(service(false));

    let payload = json!({
        "popup_id": "pop-seongsu",
        "visitor_id": "user-301",
        "location": { "latitude": 212.0, "longitude": 127.0 },
    });

    let response = router
        .oneshot(checkin_request(payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_popup_is_not_found() {
    let router = checkin_router(service(false));

    let payload = json!({
        "popup_id": "pop-nowhere",
        "visitor_id": "user-301",
    });

    let response = router
        .oneshot(checkin_request(payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
