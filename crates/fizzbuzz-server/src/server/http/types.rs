use crate::server::{config::ServerConfig, error::ApiError};
use core::num::NonZeroU64;
use fizzbuzz::RequestSignature;
use serde::{Deserialize, Serialize};

/// Query parameters of `GET /fizzbuzz`.
///
/// Integers are decoded signed so that `int1=-3` reaches validation and is
/// reported as out of range rather than as a decoding failure.
#[derive(Debug, Default, Deserialize)]
pub struct FizzBuzzParams {
    pub int1: Option<i64>,
    pub int2: Option<i64>,
    pub limit: Option<i64>,
    pub str1: Option<String>,
    pub str2: Option<String>,
}

impl FizzBuzzParams {
    /// Checks every parameter and builds the request's signature, filling in
    /// the configured default labels for missing or empty ones.
    pub fn validate(self, config: &ServerConfig) -> Result<RequestSignature, ApiError> {
        let divisor1 = positive("int1", self.int1)?;
        let divisor2 = positive("int2", self.int2)?;
        let limit = positive("limit", self.limit)?.get();

        if limit > config.max_limit {
            return Err(ApiError::validation(format!(
                "limit {limit} exceeds maximum allowed ({})",
                config.max_limit
            )));
        }

        let label1 = label(self.str1, &config.default_str1);
        let label2 = label(self.str2, &config.default_str2);

        Ok(RequestSignature::new(divisor1, divisor2, limit, label1, label2))
    }
}

fn positive(field: &str, value: Option<i64>) -> Result<NonZeroU64, ApiError> {
    let value = value.ok_or_else(|| ApiError::validation(format!("{field} is required")))?;
    u64::try_from(value)
        .ok()
        .and_then(NonZeroU64::new)
        .ok_or_else(|| ApiError::validation(format!("{field} must be greater than 0 (got {value})")))
}

fn label(value: Option<String>, default: &str) -> String {
    value
        .filter(|label| !label.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FizzBuzzResponse {
    pub result: Vec<String>,
}

/// The most frequent parameter set, flattened next to its hit count.
#[derive(Debug, Serialize, Deserialize)]
pub struct MostFrequentRequest {
    #[serde(flatten)]
    pub signature: RequestSignature,
    pub hits: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatsResponse {
    MostFrequent {
        most_frequent_request: MostFrequentRequest,
    },
    Empty {
        message: String,
    },
}

pub const NO_REQUESTS_YET: &str = "No requests have been made yet";
