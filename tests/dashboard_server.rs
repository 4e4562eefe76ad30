//! End-to-end tests for the dashboard HTTP servers

use epmine::core::DashboardVariant;
use epmine::render::GraphvizRenderer;
use epmine::server::{self, AppState, LoadedLog};

use std::net::SocketAddr;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const CSV: &str = "case_id,activity,timestamp\n\
                   s1,Study_Es_1_1,2024-10-03 10:00:00\n\
                   s1,Deeds_Es_1_1,2024-10-03 10:05:00\n\
                   s1,TextEditor_Es_1_1,2024-10-03 10:20:00\n\
                   s2,Study_Es_1_1,2024-10-03 11:00:00\n\
                   s2,Deeds_Es_1_1,2024-10-03 11:30:00\n\
                   s2,Deeds_Es_1_1,2024-10-03 11:40:00\n";

/// Serve `variant` on an ephemeral port and return its address
async fn start(variant: DashboardVariant) -> Result<SocketAddr, Box<dyn std::error::Error>> {
    let listener = server::bind("127.0.0.1", 0).await?;
    let addr = listener.local_addr()?;
    let state = AppState::new(
        variant,
        addr.port(),
        GraphvizRenderer::new("epmine-test-missing-dot", "svg"),
        LoadedLog::from_upload(CSV, None)?,
    );
    tokio::spawn(server::serve(listener, state));
    Ok(addr)
}

#[tokio::test]
async fn test_health_reports_loaded_log() -> TestResult {
    let addr = start(DashboardVariant::Minimal).await?;

    let health: serde_json::Value = reqwest::get(format!("http://{addr}/api/health"))
        .await?
        .json()
        .await?;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["variant"], "minimal");
    assert_eq!(health["events"], 6);
    assert_eq!(health["cases"], 2);
    assert!(health["error"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_summary_metrics() -> TestResult {
    let addr = start(DashboardVariant::Minimal).await?;

    let summary: serde_json::Value = reqwest::get(format!("http://{addr}/api/summary"))
        .await?
        .json()
        .await?;
    assert_eq!(summary["total_cases"], 2);
    assert_eq!(summary["total_events"], 6);
    assert_eq!(summary["unique_activities"], 3);
    assert_eq!(summary["activity_counts"][0][0], "Deeds_Es_1_1");
    assert_eq!(summary["activity_counts"][0][1], 3);
    Ok(())
}

#[tokio::test]
async fn test_minimal_page_has_no_enhanced_panels() -> TestResult {
    let addr = start(DashboardVariant::Minimal).await?;

    let page = reqwest::get(format!("http://{addr}/")).await?.text().await?;
    assert!(page.contains("Educational Process Mining - Minimal"));
    assert!(page.contains("Loaded 6 events from upload"));
    assert!(!page.contains("Bottlenecks"));

    for path in ["/api/bottlenecks", "/api/patterns", "/process-map"] {
        let response = reqwest::get(format!("http://{addr}{path}")).await?;
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND, "{path}");
    }
    Ok(())
}

#[tokio::test]
async fn test_enhanced_pattern_panels() -> TestResult {
    let addr = start(DashboardVariant::Enhanced).await?;

    let page = reqwest::get(format!("http://{addr}/")).await?.text().await?;
    assert!(page.contains("Educational Process Mining - Enhanced"));
    assert!(page.contains("Process Patterns"));

    let patterns: serde_json::Value = reqwest::get(format!("http://{addr}/api/patterns"))
        .await?
        .json()
        .await?;
    // s2 repeats Deeds_Es_1_1
    assert_eq!(patterns["rework_patterns"][0]["activity"], "Deeds_Es_1_1");
    assert_eq!(patterns["rework_patterns"][0]["rework_count"], 1);
    assert_eq!(patterns["variant_distribution"].as_array().map(Vec::len), Some(2));

    let bottlenecks = reqwest::get(format!("http://{addr}/api/bottlenecks")).await?;
    assert!(bottlenecks.status().is_success());
    Ok(())
}

#[tokio::test]
async fn test_upload_replaces_log() -> TestResult {
    let addr = start(DashboardVariant::Enhanced).await?;
    let client = reqwest::Client::new();

    let upload = "case_id,activity,timestamp\n\
                  u1,Aulaweb,2024-10-04 09:00:00\n\
                  u1,Diagram,2024-10-04 09:10:00\n";
    let response = client
        .post(format!("http://{addr}/api/upload"))
        .body(upload)
        .send()
        .await?;
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["events"], 2);
    assert_eq!(body["cases"], 1);

    let health: serde_json::Value = client
        .get(format!("http://{addr}/api/health"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(health["events"], 2);
    assert_eq!(health["source"], "upload");
    Ok(())
}

#[tokio::test]
async fn test_bad_upload_keeps_current_log() -> TestResult {
    let addr = start(DashboardVariant::Enhanced).await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{addr}/api/upload"))
        .body("no,useful,columns\n1,2,3\n")
        .send()
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert!(body["error"].is_string());

    let health: serde_json::Value = client
        .get(format!("http://{addr}/api/health"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(health["events"], 6);
    Ok(())
}

#[tokio::test]
async fn test_large_upload_is_accepted() -> TestResult {
    let addr = start(DashboardVariant::Enhanced).await?;
    let client = reqwest::Client::new();

    // Well past axum's 2 MiB default body limit
    let mut upload = String::from("case_id,activity,timestamp\n");
    let mut rows = 0;
    while upload.len() < 3 * 1024 * 1024 {
        let case = rows / 100;
        let minute = rows % 60;
        upload.push_str(&format!(
            "student_{case:05},Deeds_Es_1_1,2024-10-04 09:{minute:02}:00\n"
        ));
        rows += 1;
    }

    let response = client
        .post(format!("http://{addr}/api/upload"))
        .header("content-type", "text/csv")
        .body(upload)
        .send()
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["events"], rows);
    Ok(())
}

#[tokio::test]
async fn test_xes_upload_replaces_log() -> TestResult {
    let addr = start(DashboardVariant::Enhanced).await?;
    let client = reqwest::Client::new();

    let upload = r#"<?xml version="1.0" encoding="UTF-8"?>
<log xes.version="1.0">
  <trace>
    <string key="concept:name" value="x1"/>
    <event>
      <string key="concept:name" value="Study_Es_2_1"/>
      <date key="time:timestamp" value="2024-10-04T09:00:00.000+00:00"/>
    </event>
    <event>
      <string key="concept:name" value="Deeds_Es_2_1"/>
      <date key="time:timestamp" value="2024-10-04T09:15:00.000+00:00"/>
    </event>
  </trace>
</log>
"#;
    let response = client
        .post(format!("http://{addr}/api/upload"))
        .body(upload)
        .send()
        .await?;
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["events"], 2);
    assert_eq!(body["cases"], 1);

    let summary: serde_json::Value = client
        .get(format!("http://{addr}/api/summary"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(summary["total_cases"], 1);
    assert_eq!(summary["unique_activities"], 2);
    Ok(())
}
