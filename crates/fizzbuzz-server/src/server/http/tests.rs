use crate::server::{
    config::ServerConfig,
    http::{AppState, router},
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn test_config() -> ServerConfig {
    ServerConfig {
        server_addr: ([127, 0, 0, 1], 0).into(),
        max_limit: 10_000,
        default_str1: "fizz".to_owned(),
        default_str2: "buzz".to_owned(),
        log_json: false,
        service_name: "fizzbuzz-server-test".to_owned(),
        otlp_endpoint: "http://localhost:4317".to_owned(),
    }
}

fn test_app() -> (Router, AppState) {
    let state = AppState::new(test_config());
    (router(state.clone()), state)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn error_message(body: &Value) -> &str {
    body["error"].as_str().expect("error body")
}

#[tokio::test]
async fn valid_request_returns_sequence() {
    let (app, _) = test_app();
    let (status, body) = get(&app, "/fizzbuzz?int1=3&int2=5&limit=15&str1=fizz&str2=buzz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "result": [
                "1", "2", "fizz", "4", "buzz", "fizz", "7", "8", "fizz", "buzz", "11", "fizz",
                "13", "14", "fizzbuzz"
            ]
        })
    );
}

#[tokio::test]
async fn custom_labels_are_used() {
    let (app, _) = test_app();
    let (status, body) = get(&app, "/fizzbuzz?int1=3&int2=5&limit=15&str1=hello&str2=world").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"][2], "hello");
    assert_eq!(body["result"][4], "world");
    assert_eq!(body["result"][14], "helloworld");
}

#[tokio::test]
async fn missing_labels_fall_back_to_defaults() {
    let (app, state) = test_app();
    let (status, body) = get(&app, "/fizzbuzz?int1=3&int2=5&limit=15&str1=").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"][14], "fizzbuzz");

    let (signature, hits) = state.tracker.most_frequent().unwrap();
    assert_eq!((signature.label1(), signature.label2(), hits), ("fizz", "buzz", 1));
}

#[tokio::test]
async fn missing_parameters_fail_validation() {
    let (app, state) = test_app();
    let (status, body) = get(&app, "/fizzbuzz?int1=3").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).contains("validation"));
    assert!(state.tracker.is_empty());
}

#[tokio::test]
async fn zero_and_negative_divisors_fail_validation() {
    let (app, state) = test_app();
    for uri in [
        "/fizzbuzz?int1=0&int2=5&limit=15",
        "/fizzbuzz?int1=3&int2=-5&limit=15",
        "/fizzbuzz?int1=3&int2=5&limit=0",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(error_message(&body).contains("validation"), "{uri}");
    }
    assert!(state.tracker.is_empty());
}

#[tokio::test]
async fn limit_above_maximum_fails_validation() {
    let (app, _) = test_app();
    let (status, body) = get(&app, "/fizzbuzz?int1=3&int2=5&limit=20000").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).contains("validation"));
    assert!(error_message(&body).contains("10000"));
}

#[tokio::test]
async fn limit_at_maximum_is_accepted() {
    let (app, _) = test_app();
    let (status, body) = get(&app, "/fizzbuzz?int1=3&int2=5&limit=10000").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"].as_array().unwrap().len(), 10_000);
}

#[tokio::test]
async fn non_numeric_parameter_is_a_format_error() {
    let (app, _) = test_app();
    let (status, body) = get(&app, "/fizzbuzz?int1=three&int2=5&limit=15").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "Invalid parameter format");
}

#[tokio::test]
async fn stats_without_requests() {
    let (app, _) = test_app();
    let (status, body) = get(&app, "/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "No requests have been made yet" }));
}

#[tokio::test]
async fn stats_report_most_frequent_request() {
    let (app, _) = test_app();
    for _ in 0..3 {
        get(&app, "/fizzbuzz?int1=3&int2=5&limit=15&str1=fizz&str2=buzz").await;
    }
    get(&app, "/fizzbuzz?int1=2&int2=7&limit=10&str1=hello&str2=world").await;
    // Rejected requests are not counted.
    for _ in 0..5 {
        get(&app, "/fizzbuzz?int1=0&int2=7&limit=10").await;
    }

    let (status, body) = get(&app, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "most_frequent_request": {
                "int1": 3,
                "int2": 5,
                "limit": 15,
                "str1": "fizz",
                "str2": "buzz",
                "hits": 3,
            }
        })
    );
}

#[tokio::test]
async fn stats_with_tied_requests_return_either() {
    let (app, _) = test_app();
    for _ in 0..2 {
        get(&app, "/fizzbuzz?int1=3&int2=5&limit=15&str1=fizz&str2=buzz").await;
        get(&app, "/fizzbuzz?int1=2&int2=7&limit=10&str1=hello&str2=world").await;
    }

    let (_, body) = get(&app, "/stats").await;
    let top = &body["most_frequent_request"];
    assert_eq!(top["hits"], 2);
    assert!(
        top["str1"] == "fizz" || top["str1"] == "hello",
        "unexpected winner {top}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_are_all_counted() {
    let (app, state) = test_app();

    let tasks: Vec<_> = (0..64)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move {
                get(&app, "/fizzbuzz?int1=3&int2=5&limit=15").await;
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let (signature, hits) = state.tracker.most_frequent().unwrap();
    assert_eq!(hits, 64);
    assert_eq!(signature.to_string(), "3,5,15,fizz,buzz");
}

#[tokio::test]
async fn each_app_has_its_own_statistics() {
    let (first, _) = test_app();
    let (second, _) = test_app();
    get(&first, "/fizzbuzz?int1=3&int2=5&limit=15").await;

    let (_, body) = get(&second, "/stats").await;
    assert_eq!(body["message"], "No requests have been made yet");
}

#[tokio::test]
async fn docs_describe_both_endpoints() {
    let (app, _) = test_app();
    let (status, body) = get(&app, "/docs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fizzbuzz_endpoint"]["path"], "/fizzbuzz");
    assert_eq!(body["fizzbuzz_endpoint"]["max_limit"], 10_000);
    assert_eq!(body["stats_endpoint"]["path"], "/stats");
}

#[tokio::test]
async fn health_is_ok() {
    let (app, _) = test_app();
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
