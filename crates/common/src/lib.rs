use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const HEALTHY_STATUS: &str = "healthy";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetRequest {
    pub key: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MsetRequest {
    pub kvs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
}

/// Body shared by `mget` and `mdelete`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct KeysRequest {
    pub keys: Vec<String>,
}

/// Reply of every mutating endpoint: `{success, message}` or `{success:false, error}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct MutationReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MutationReply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }

    pub fn message_text(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    pub fn error_text(&self) -> &str {
        self.error.as_deref().unwrap_or_default()
    }
}

/// Reply of `GET /api/v1/get/{key}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ValueReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reply of `mget` and `scan`: `{count, results}` or `{error}`.
///
/// `results` keeps the order in which the service listed the pairs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct EntriesReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    pub results: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EntriesReply {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let results = pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
            .collect::<Map<_, _>>();
        Self {
            count: Some(results.len() as u64),
            results,
            error: None,
        }
    }

    /// Pairs in service order; non-string values are rendered as JSON text.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.results
            .iter()
            .map(|(key, value)| (key.clone(), value_text(value)))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct HealthReport {
    pub status: String,
    pub message: String,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HEALTHY_STATUS
    }
}

/// A numeric config input: parsed when it parses, otherwise forwarded verbatim
/// so the service can reject it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NumericField<T> {
    Number(T),
    Raw(String),
}

impl<T: std::str::FromStr> NumericField<T> {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.parse::<T>() {
            Ok(number) => Self::Number(number),
            Err(_) => Self::Raw(trimmed.to_string()),
        }
    }
}

/// Partial update for `POST /api/v1/config`; absent fields are not serialized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ConfigUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rocksdb_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_store_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_value_size: Option<NumericField<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_disk_usage: Option<NumericField<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eviction_check_interval: Option<NumericField<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eviction_batch_size: Option<NumericField<i64>>,
}

pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
