//! ForecastClient end to end: submit, observe, fetch, render

use imhotep_core::application::render::HIGH_RISK_HIGHLIGHTS;
use imhotep_core::domain::{JobStatus, Level};
use imhotep_core::port::{CookieSession, StaticSession};
use imhotep_sdk::{
    ClientConfig, ForecastClient, ResultView, SdkError, SubmissionOutcome, TransportKind,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig {
        api_url: server.uri(),
        poll_interval_secs: 1,
        ..ClientConfig::default()
    }
}

fn client(server: &MockServer) -> ForecastClient {
    let session = Arc::new(StaticSession::new(
        Some("tok-e2e".to_string()),
        Some("acme".to_string()),
    ));
    ForecastClient::connect(config(server), session).expect("client")
}

fn write_dataset(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("imhotep-e2e-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join(name);
    std::fs::write(&path, "date,sku,units\n2024-01-01,SKU-1,4\n2024-01-02,SKU-1,6\n")
        .expect("write dataset");
    path
}

fn completed_result(job_id: &str) -> serde_json::Value {
    json!({
        "job_id": job_id,
        "status": "completed",
        "summary": {
            "total_rows": 2,
            "columns_detected": ["date", "sku", "units"],
            "missing_values": 0,
            "anomalies_detected": 0,
            "date_range": "2024-01-01 to 2024-01-02"
        },
        "forecasts": [
            {"sku": "SKU-1", "current_stock": 2, "predicted_demand": 9.5, "risk_level": "high",
             "recommendation": "Reorder 10 units", "potential_revenue_impact": 250.0},
            {"sku": "SKU-2", "current_stock": 40, "predicted_demand": 3.0, "risk_level": "low",
             "recommendation": "Hold", "potential_revenue_impact": -20.0}
        ],
        "insights": [
            {"type": "stockout", "message": "SKU-1 runs out in 3 days", "priority": "high", "sku": "SKU-1"},
            {"type": "trend", "message": "Weekend demand is rising", "priority": "medium"}
        ],
        "methodology_notes": ["Exponential smoothing per SKU"]
    })
}

#[tokio::test]
async fn upload_then_poll_until_completed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/forecast"))
        .and(header("authorization", "Bearer tok-e2e"))
        .and(header("x-tenant-id", "acme"))
        .and(body_string_contains("filename=\"sales.csv\""))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"job_id": "job-e2e"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast/job-e2e"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"job_id": "job-e2e", "status": "running"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast/job-e2e"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completed_result("job-e2e")))
        .mount(&server)
        .await;

    let result = client(&server)
        .forecast_file(write_dataset("sales.csv"), TransportKind::Poll)
        .await
        .expect("forecast ok");

    assert_eq!(result.status, JobStatus::Completed);
    let view = ResultView::new(&result);
    let top = view.top_high_risk(HIGH_RISK_HIGHLIGHTS);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].sku, "SKU-1");
    assert_eq!(view.high_priority_insights().len(), 1);
    assert_eq!(view.total_revenue_impact(), 230.0);
}

#[tokio::test]
async fn sample_over_stream_fetches_final_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/forecasts"))
        .and(body_json(json!({"dataset_id": "sample-dataset-id", "parameters": {"industry": "grocery"}})))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"job_id": "job-s", "status": "pending"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecasts/job-s/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "data: {\"type\":\"complete\",\"data\":{\"forecastId\":\"f-s\",\"metrics\":{},\"timestamp\":\"t\"}}\n\n",
            "text/event-stream",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast/job-s"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completed_result("job-s")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let outcome = client
        .submit_sample(Some("grocery".to_string()))
        .await
        .expect("submit ok");
    assert_eq!(outcome.job_id(), Some("job-s"));

    let result = client
        .wait_for_result(outcome, TransportKind::Push)
        .await
        .expect("result");

    assert_eq!(result.forecasts.len(), 2);
    assert_eq!(result.forecasts[0].risk_level, Level::High);
}

#[tokio::test]
async fn presigned_upload_with_synchronous_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/datasets/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": format!("{}/storage", server.uri()),
            "fields": {"key": "uploads/inventory.xlsx"},
            "dataset_id": "ds-77"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/storage"))
        .and(body_string_contains("uploads/inventory.xlsx"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/forecasts"))
        .and(body_json(json!({"dataset_id": "ds-77", "parameters": {}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "summary": {"total_rows": 0},
            "forecasts": [],
            "insights": [],
            "methodology_notes": []
        })))
        .mount(&server)
        .await;

    let outcome = client(&server)
        .upload_presigned(write_dataset("inventory.xlsx"))
        .await
        .expect("upload ok");

    let result = match outcome {
        SubmissionOutcome::Ready(result) => result,
        other => panic!("expected synchronous result, got {:?}", other),
    };
    let view = ResultView::new(&result);
    assert!(view.is_empty());
    assert!(view.top_high_risk(HIGH_RISK_HIGHLIGHTS).is_empty());
}

#[tokio::test]
async fn job_failure_reports_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast/job-f"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_id": "job-f",
            "status": "failed",
            "error": "Column 'date' missing"
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .wait_for_result(
            SubmissionOutcome::Accepted {
                job_id: "job-f".to_string(),
            },
            TransportKind::Poll,
        )
        .await
        .expect_err("should fail");

    match err {
        SdkError::JobFailed { job_id, message } => {
            assert_eq!(job_id, "job-f");
            assert_eq!(message, "Column 'date' missing");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn cookie_session_supplies_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecasts/job-c"))
        .and(header("authorization", "Bearer from-cookie"))
        .and(header("x-tenant-id", "tenant-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_id": "job-c",
            "status": "completed",
            "metrics": {},
            "forecast": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = Arc::new(CookieSession::with_default_names(
        "theme=dark; imhotep_token=from-cookie; imhotep_tenant=tenant-9",
    ));
    let client = ForecastClient::connect(config(&server), session).expect("client");

    let series = client.series("job-c").await.expect("series");

    assert_eq!(series.metrics.rmse_display(), "N/A");
    assert!(series.forecast.is_empty());
}

#[tokio::test]
async fn rejected_submission_surfaces_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(413).set_body_json(json!({"message": "File too large"})))
        .mount(&server)
        .await;

    let err = client(&server)
        .submit_file(write_dataset("big.csv"))
        .await
        .expect_err("should fail");

    assert_eq!(err.status(), Some(413));
    assert!(err.to_string().contains("File too large"));
}

#[tokio::test]
async fn unsupported_file_type_fails_before_any_request() {
    let server = MockServer::start().await;
    let path = write_dataset("notes.txt");

    let err = client(&server).submit_file(path).await.expect_err("should fail");

    assert!(matches!(err, SdkError::Validation(_)));
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn synchronous_failure_is_not_a_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/forecasts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_id": "job-x",
            "status": "failed",
            "error": "dataset has no date column"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast/job-x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completed_result("job-x")))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server);
    let outcome = client.submit_sample(None).await.expect("submit ok");
    assert!(matches!(outcome, SubmissionOutcome::Failed { .. }));

    let err = client
        .wait_for_result(outcome, TransportKind::Poll)
        .await
        .expect_err("failed job is an error");
    match err {
        SdkError::JobFailed { job_id, message } => {
            assert_eq!(job_id, "job-x");
            assert_eq!(message, "dataset has no date column");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn queued_response_without_job_id_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/forecasts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "queued"})))
        .mount(&server)
        .await;

    let err = client(&server)
        .submit_dataset("ds-q", None)
        .await
        .expect_err("nothing to observe");

    assert!(matches!(err, SdkError::UnexpectedResponse(_)));
}

#[tokio::test]
async fn lagging_status_after_stream_complete_is_polled_until_completed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecasts/job-l/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "data: {\"type\":\"complete\",\"data\":{\"forecastId\":\"f-l\",\"metrics\":{},\"timestamp\":\"t\"}}\n\n",
            "text/event-stream",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast/job-l"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"job_id": "job-l", "status": "running"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast/job-l"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completed_result("job-l")))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server)
        .wait_for_result(
            SubmissionOutcome::Accepted {
                job_id: "job-l".to_string(),
            },
            TransportKind::Push,
        )
        .await
        .expect("result");

    assert_eq!(result.status, JobStatus::Completed);
    assert_eq!(result.forecasts.len(), 2);
}
