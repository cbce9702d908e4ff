use std::fs;
use std::time::Duration;

use anyhow::Result;
use batchpit::batch::{load, read_request_file};
use batchpit::executor::{write_results, BatchRunner, Outcome, RunnerOptions};
use batchpit::BatchError;
use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::tempdir;

#[tokio::test]
async fn single_request_round_trips_through_files() -> Result<()> {
    let temp = tempdir()?;
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/ok");
            then.status(200).json_body(json!({"x": 1}));
        })
        .await;

    let input = temp.path().join("main-request.json");
    let url = server.url("/ok");
    fs::write(&input, json!([{"method": "GET", "url": url}]).to_string())?;

    let descriptors = read_request_file(&input).await?;
    let results = BatchRunner::new(RunnerOptions::default())
        .run(descriptors, |_, _| {})
        .await;

    let output = temp.path().join("main-response.json");
    write_results(&output, &results)?;

    let written: Value = serde_json::from_str(&fs::read_to_string(&output)?)?;
    let mut entry = written[0].clone();
    assert!(entry["response"]["headers"].is_object());
    if let Some(response) = entry["response"].as_object_mut() {
        response.remove("headers");
    }
    assert_eq!(
        entry,
        json!({
            "request": {"index": 0, "method": "GET", "url": url},
            "response": {"status": 200, "statusText": "OK", "data": {"x": 1}}
        })
    );
    Ok(())
}

#[tokio::test]
async fn large_batch_keeps_count_and_order() -> Result<()> {
    let server = MockServer::start_async().await;
    for slot in 0..5u64 {
        server
            .mock_async(move |when, then| {
                when.path(format!("/item/{slot}"));
                then.status(200)
                    .delay(Duration::from_millis(50 * (5 - slot)))
                    .json_body(json!({"slot": slot}));
            })
            .await;
    }

    let requests: Vec<Value> = (0..25)
        .map(|i| json!({"method": "GET", "url": server.url(format!("/item/{}", i % 5))}))
        .collect();
    let descriptors = load(Value::Array(requests))?;

    let mut seen = Vec::new();
    let results = BatchRunner::new(RunnerOptions::default())
        .run(descriptors, |completed, total| seen.push((completed, total)))
        .await;

    assert_eq!(results.len(), 25);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.request.index, i);
        assert_eq!(result.response.data, json!({"slot": i % 5}));
        assert_eq!(result.outcome(), Outcome::Success);
    }
    let counts: Vec<usize> = seen.iter().map(|(completed, _)| *completed).collect();
    assert_eq!(counts, (1..=25).collect::<Vec<_>>());
    assert!(seen.iter().all(|(_, total)| *total == 25));
    Ok(())
}

#[tokio::test]
async fn object_input_is_rejected_before_any_request() -> Result<()> {
    let temp = tempdir()?;
    let input = temp.path().join("main-request.json");
    fs::write(&input, r#"{"method":"GET","url":"https://example.test"}"#)?;

    let err = read_request_file(&input).await.unwrap_err();
    assert!(matches!(err, BatchError::InvalidInputShape { found: "object" }));
    Ok(())
}
