//! End-to-end tests for the council server against a local meetings API

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Html,
    routing::get,
    Json, Router,
};
use council_domain::traits::MinutesSource;
use council_domain::MeetingRecord;
use council_extractor::ExtractorConfig;
use council_llm::MockProvider;
use council_pipeline::PipelineConfig;
use council_server::handlers::{create_router, AppState};
use council_sources::{CouncilApiClient, CouncilApiConfig, MinutesClient, MinutesConfig};
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::net::TcpListener;
use tower::ServiceExt;

async fn spawn_upstream(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn listing() -> Value {
    json!([
        { "eventTitle": "Regular Council", "locationStatus": "Held",
          "eventDateStart": "2026-01-15T09:30:00", "relatedURL": "/20260115/regu.htm" },
        { "eventTitle": "Public Hearing", "locationStatus": "Held",
          "eventDateStart": "2026-03-02T18:00:00", "relatedURL": "/20260302/phea.htm" },
        { "eventTitle": "Standing Committee", "locationStatus": "Cancelled",
          "eventDateStart": "2026-02-10T09:30:00", "relatedURL": "" }
    ])
}

/// Meetings API plus meeting pages that have no minutes posted yet
fn healthy_upstream() -> Router {
    let page = || async { Html("<html><body><p>Agenda only</p></body></html>") };
    Router::new()
        .route("/CouncilMeetings", get(|| async { Json(listing()) }))
        .route("/20260115/regu.htm", get(page))
        .route("/20260302/phea.htm", get(page))
}

fn failing_upstream() -> Router {
    Router::new().route(
        "/CouncilMeetings",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream down") }),
    )
}

fn council_api(base: &str) -> CouncilApiClient {
    CouncilApiClient::new(CouncilApiConfig {
        base_url: base.to_string(),
        site_base_url: base.to_string(),
        ..CouncilApiConfig::default()
    })
    .unwrap()
}

/// Minutes text keyed by meeting id
struct StaticMinutes(HashMap<usize, &'static str>);

impl MinutesSource for StaticMinutes {
    async fn minutes_text(&self, meeting: &MeetingRecord) -> Option<String> {
        self.0.get(&meeting.id).map(|text| text.to_string())
    }
}

fn app(base: &str, llm: Option<MockProvider>) -> Router {
    let council_api = council_api(base);
    let minutes = MinutesClient::new(MinutesConfig {
        site_base_url: base.to_string(),
        ..MinutesConfig::default()
    })
    .unwrap();

    let state = AppState::new(
        council_api,
        minutes,
        llm,
        ExtractorConfig::default(),
        PipelineConfig::with_workers(2),
    )
    .unwrap();
    create_router(state, &["http://localhost:5173".to_string()])
}

/// Split an SSE body into (event, data) pairs, skipping comments
fn parse_sse(body: &str) -> Vec<(String, Value)> {
    body.split("\n\n")
        .filter_map(|frame| {
            let mut name = None;
            let mut data = None;
            for line in frame.lines() {
                if let Some(rest) = line.strip_prefix("event:") {
                    name = Some(rest.trim().to_string());
                } else if let Some(rest) = line.strip_prefix("data:") {
                    data = Some(serde_json::from_str(rest.trim()).unwrap());
                }
            }
            Some((name?, data?))
        })
        .collect()
}

async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_stream_emits_meetings_newest_first() {
    let base = spawn_upstream(healthy_upstream()).await;
    let (status, body) = get_body(app(&base, None), "/api/meetings").await;
    assert_eq!(status, StatusCode::OK);

    let frames = parse_sse(&body);
    let names: Vec<&str> = frames.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["meeting", "meeting", "meeting", "complete"]);

    let ids: Vec<i64> = frames[..3]
        .iter()
        .map(|(_, data)| data["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 0]);

    assert_eq!(frames[0].1["meetingType"], "Public Hearing");
    assert_eq!(frames[0].1["meetingUrl"], format!("{}/20260302/phea.htm", base));
    assert!(frames[0].1.get("decisions").is_none());
    assert_eq!(frames[3].1, json!({ "count": 3 }));
}

#[tokio::test]
async fn test_stream_mixes_enriched_and_degraded_meetings_in_order() {
    let base = spawn_upstream(healthy_upstream()).await;

    let minutes = StaticMinutes(HashMap::from([
        (1, "THAT Council approve the Main Street bike lanes."),
        (2, "THAT Council receive the report for information."),
        (0, "THAT Council refer the Kingsway rezoning to public hearing."),
    ]));
    let mut llm = MockProvider::new("[]");
    llm.add_response(
        "Main Street bike lanes",
        r#"[{
            "title": "Bike lanes approved",
            "content": "THAT Council approve the Main Street bike lanes.",
            "location": [49.2606, -123.1009],
            "summary": "Council approved bike lanes on Main Street."
        }]"#,
    );
    llm.add_error("Kingsway rezoning");

    let state = AppState::new(
        council_api(&base),
        minutes,
        Some(llm.clone()),
        ExtractorConfig::default(),
        PipelineConfig::with_workers(3),
    )
    .unwrap();
    let router = create_router(state, &["http://localhost:5173".to_string()]);

    let (status, body) = get_body(router, "/api/meetings").await;
    assert_eq!(status, StatusCode::OK);

    let frames = parse_sse(&body);
    let names: Vec<&str> = frames.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["meeting", "meeting", "meeting", "complete"]);

    let enriched = &frames[0].1;
    assert_eq!(enriched["id"], 1);
    assert_eq!(enriched["pdfText"], "THAT Council approve the Main Street bike lanes.");
    assert_eq!(enriched["decisions"][0]["title"], "Bike lanes approved");

    let empty = &frames[1].1;
    assert_eq!(empty["id"], 2);
    assert_eq!(empty["decisions"], json!([]));

    // A failed extraction is sent as the meeting exactly as listed
    let degraded = &frames[2].1;
    assert_eq!(degraded["id"], 0);
    assert_eq!(degraded["meetingType"], "Regular Council");
    assert!(degraded.get("pdfText").is_none());
    assert!(degraded.get("decisions").is_none());

    assert_eq!(frames[3].1, json!({ "count": 3 }));
    assert_eq!(llm.call_count(), 3);
}

#[tokio::test]
async fn test_stream_applies_date_filter() {
    let base = spawn_upstream(healthy_upstream()).await;
    let (_, body) = get_body(
        app(&base, Some(MockProvider::new("[]"))),
        "/api/meetings?startDate=2026-02-01&endDate=2026-02-28",
    )
    .await;

    let frames = parse_sse(&body);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].0, "meeting");
    assert_eq!(frames[0].1["id"], 2);
    assert_eq!(frames[1].1, json!({ "count": 1 }));
}

#[tokio::test]
async fn test_stream_reports_fetch_failure_as_single_error() {
    let base = spawn_upstream(failing_upstream()).await;
    let (status, body) = get_body(app(&base, None), "/api/meetings").await;
    assert_eq!(status, StatusCode::OK);

    let frames = parse_sse(&body);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].0, "error");
    let message = frames[0].1["message"].as_str().unwrap();
    assert!(message.contains("500"), "unexpected message: {}", message);
}

#[tokio::test]
async fn test_stream_rejects_bad_date_before_streaming() {
    let base = spawn_upstream(healthy_upstream()).await;
    let (status, body) = get_body(app(&base, None), "/api/meetings?startDate=yesterday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "Invalid request");
}

#[tokio::test]
async fn test_sample_endpoint() {
    let base = spawn_upstream(healthy_upstream()).await;
    let (status, body) = get_body(app(&base, None), "/api/meetings/test").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["totalCount"], 3);
    assert_eq!(json["sampleCount"], 3);
    assert_eq!(json["meetings"][0]["id"], 1);
}

#[tokio::test]
async fn test_sample_endpoint_fetch_failure() {
    let base = spawn_upstream(failing_upstream()).await;
    let (status, body) = get_body(app(&base, None), "/api/meetings/test").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Failed to fetch meetings");
}

#[tokio::test]
async fn test_health_alongside_stream_routes() {
    let base = spawn_upstream(healthy_upstream()).await;
    let (status, body) = get_body(app(&base, None), "/health").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
}
