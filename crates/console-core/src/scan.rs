use std::sync::Arc;

use client_sdk::KvApi;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::messages::{REQUEST_FAILED, labelled};
use crate::outcome::{KeyValuePair, pairs_of};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    #[default]
    Table,
    KeysOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScanRegion {
    Table { count: u64, rows: Vec<KeyValuePair> },
    Keys { keys: Vec<String> },
    Error { message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanView {
    pub prefix: String,
    pub result: Option<ScanRegion>,
}

/// Prefix listing. Each call replaces the whole result region.
pub struct ScanController<S> {
    service: Arc<S>,
    state: Arc<Mutex<ScanView>>,
}

impl<S> Clone for ScanController<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: KvApi> ScanController<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            state: Arc::new(Mutex::new(ScanView::default())),
        }
    }

    pub async fn view(&self) -> ScanView {
        self.state.lock().await.clone()
    }

    pub async fn scan(&self, prefix: impl Into<String>) -> ScanRegion {
        self.run(prefix.into(), ScanMode::Table).await
    }

    pub async fn scan_keys_only(&self, prefix: impl Into<String>) -> ScanRegion {
        self.run(prefix.into(), ScanMode::KeysOnly).await
    }

    pub async fn run(&self, prefix: String, mode: ScanMode) -> ScanRegion {
        self.state.lock().await.prefix = prefix.clone();

        let region = match self.service.scan(&prefix).await {
            Ok(reply) => match reply.error.clone() {
                Some(message) => {
                    warn!(prefix = %prefix, error = %message, "scan failed");
                    ScanRegion::Error { message }
                }
                None => {
                    let rows = pairs_of(&reply);
                    info!(prefix = %prefix, ?mode, matches = rows.len(), "scan succeeded");
                    match mode {
                        ScanMode::Table => ScanRegion::Table {
                            count: reply.count.unwrap_or(rows.len() as u64),
                            rows,
                        },
                        ScanMode::KeysOnly => ScanRegion::Keys {
                            keys: rows.into_iter().map(|pair| pair.key).collect(),
                        },
                    }
                }
            },
            Err(err) => {
                error!(prefix = %prefix, error = %err, "scan request failed");
                ScanRegion::Error {
                    message: labelled(REQUEST_FAILED, &err),
                }
            }
        };

        self.state.lock().await.result = Some(region.clone());
        region
    }
}
