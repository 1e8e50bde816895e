//! Request handlers.
//!
//! `/fizzbuzz` validates the query, generates the sequence and then records
//! the request's signature. `/stats` only reads the tracker. Neither holds the
//! tracker lock across an `.await`.

use crate::server::{
    error::ApiError,
    http::{
        AppState,
        types::{
            FizzBuzzParams, FizzBuzzResponse, MostFrequentRequest, NO_REQUESTS_YET, StatsResponse,
        },
    },
    telemetry::{
        record_fizzbuzz_request, record_result_size, record_stats_request, set_most_frequent_hits,
        set_stats_entries,
    },
};
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde_json::{Value, json};
use std::time::Instant;
use tracing::{Span, field::Empty};

/// `GET /fizzbuzz`
#[tracing::instrument(
    name = "fizzbuzz",
    skip_all,
    fields(int1 = Empty, int2 = Empty, limit = Empty, str1 = Empty, str2 = Empty)
)]
pub async fn fizzbuzz(
    State(state): State<AppState>,
    query: Result<Query<FizzBuzzParams>, QueryRejection>,
) -> Result<Json<FizzBuzzResponse>, ApiError> {
    let start = Instant::now();

    let outcome = query
        .map_err(ApiError::InvalidParameters)
        .and_then(|Query(params)| params.validate(&state.config))
        .map(|signature| {
            let span = Span::current();
            span.record("int1", signature.divisor1().get());
            span.record("int2", signature.divisor2().get());
            span.record("limit", signature.limit());
            span.record("str1", signature.label1());
            span.record("str2", signature.label2());

            let result = signature.generate();
            record_result_size(result.len());
            state.tracker.record(signature);
            FizzBuzzResponse { result }
        });

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    match &outcome {
        Ok(response) => {
            tracing::debug!(elements = response.result.len(), "fizzbuzz generated");
            record_fizzbuzz_request("success", elapsed_ms);
        }
        Err(e) => {
            tracing::warn!(error = %e, "rejected fizzbuzz request");
            record_fizzbuzz_request(e.status_label(), elapsed_ms);
        }
    }

    outcome.map(Json)
}

/// `GET /stats`
#[tracing::instrument(name = "stats", skip_all, fields(entries = Empty, hits = Empty))]
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let start = Instant::now();
    let span = Span::current();

    let (entries, most_frequent) = state.tracker.snapshot();
    span.record("entries", entries);
    set_stats_entries(entries);

    let response = match most_frequent {
        Some((signature, hits)) => {
            span.record("hits", hits);
            set_most_frequent_hits(hits);
            StatsResponse::MostFrequent {
                most_frequent_request: MostFrequentRequest { signature, hits },
            }
        }
        None => StatsResponse::Empty {
            message: NO_REQUESTS_YET.to_owned(),
        },
    };

    record_stats_request("success", start.elapsed().as_secs_f64() * 1000.0);
    Json(response)
}

/// `GET /docs`
pub async fn docs(State(state): State<AppState>) -> Json<Value> {
    let config = &state.config;
    Json(json!({
        "fizzbuzz_endpoint": {
            "path": "/fizzbuzz",
            "method": "GET",
            "params": "int1(int), int2(int), limit(int), str1(string), str2(string)",
            "description": "Returns a FizzBuzz sequence based on parameters",
            "max_limit": config.max_limit,
            "defaults": {
                "str1": config.default_str1,
                "str2": config.default_str2,
            },
        },
        "stats_endpoint": {
            "path": "/stats",
            "method": "GET",
            "params": "none",
            "description": "Returns statistics about most frequent request",
        },
    }))
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}
