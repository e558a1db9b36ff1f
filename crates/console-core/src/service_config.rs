//! Runtime configuration of the storage service: a verbatim snapshot view and
//! partial updates.

use std::sync::Arc;

use client_sdk::KvApi;
use common::{ConfigUpdate, NumericField};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::messages::{
    CONFIG_FETCH_FAILED, CONFIG_UPDATE_FAILED, CONFIG_UPDATE_OK, REQUEST_FAILED, labelled,
};
use crate::outcome::Outcome;

/// The six tunables as typed; blank means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigForm {
    pub rocksdb_path: String,
    pub disk_store_path: String,
    pub large_value_size: String,
    pub max_disk_usage: String,
    pub eviction_check_interval: String,
    pub eviction_batch_size: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SnapshotRegion {
    #[default]
    Loading,
    Loaded {
        pretty: String,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigView {
    pub snapshot: SnapshotRegion,
    pub notice: Option<Outcome>,
    pub form: ConfigForm,
}

fn non_blank(input: &str) -> Option<&str> {
    if input.trim().is_empty() {
        None
    } else {
        Some(input)
    }
}

/// Only non-blank inputs become fields of the update. Numeric inputs are not
/// validated here; see [`NumericField`].
pub fn build_config_update(form: &ConfigForm) -> ConfigUpdate {
    ConfigUpdate {
        rocksdb_path: non_blank(&form.rocksdb_path).map(str::to_string),
        disk_store_path: non_blank(&form.disk_store_path).map(str::to_string),
        large_value_size: non_blank(&form.large_value_size).map(NumericField::parse),
        max_disk_usage: non_blank(&form.max_disk_usage).map(NumericField::parse),
        eviction_check_interval: non_blank(&form.eviction_check_interval)
            .map(NumericField::parse),
        eviction_batch_size: non_blank(&form.eviction_batch_size).map(NumericField::parse),
    }
}

pub struct ConfigController<S> {
    service: Arc<S>,
    state: Arc<Mutex<ConfigView>>,
}

impl<S> Clone for ConfigController<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: KvApi> ConfigController<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            state: Arc::new(Mutex::new(ConfigView::default())),
        }
    }

    pub async fn view(&self) -> ConfigView {
        self.state.lock().await.clone()
    }

    /// Fetches the current snapshot and renders it pretty-printed.
    pub async fn refresh(&self) -> SnapshotRegion {
        let region = match self.service.config().await {
            Ok(snapshot) => SnapshotRegion::Loaded {
                pretty: serde_json::to_string_pretty(&snapshot)
                    .unwrap_or_else(|_| snapshot.to_string()),
            },
            Err(err) => {
                error!(error = %err, "failed to fetch config");
                SnapshotRegion::Error {
                    message: labelled(CONFIG_FETCH_FAILED, &err),
                }
            }
        };

        self.state.lock().await.snapshot = region.clone();
        region
    }

    /// Submits the non-blank fields. On success the form is cleared and the
    /// snapshot re-fetched; on failure the snapshot is left as it was.
    pub async fn update(&self, form: ConfigForm) -> Outcome {
        let update = build_config_update(&form);
        self.state.lock().await.form = form;

        let outcome = match self.service.update_config(&update).await {
            Ok(reply) if reply.success => {
                info!(?update, "config updated");
                Outcome::success(labelled(CONFIG_UPDATE_OK, reply.message_text()))
            }
            Ok(reply) => {
                warn!(error = reply.error_text(), "config update rejected");
                Outcome::danger(labelled(CONFIG_UPDATE_FAILED, reply.error_text()))
            }
            Err(err) => {
                error!(error = %err, "config update request failed");
                Outcome::danger(labelled(REQUEST_FAILED, &err))
            }
        };

        {
            let mut state = self.state.lock().await;
            state.notice = Some(outcome.clone());
            if outcome.is_success() {
                state.form = ConfigForm::default();
            }
        }

        if outcome.is_success() {
            self.refresh().await;
        }

        outcome
    }
}
