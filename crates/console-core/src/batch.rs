use std::str::FromStr;
use std::sync::Arc;

use client_sdk::KvApi;
use common::{KeysRequest, MsetRequest};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::field_list::{FieldList, FieldRow, ListKind, RowId, reduce_entries, reduce_keys};
use crate::messages::{
    MDELETE_FAILED, MDELETE_OK, MSET_FAILED, MSET_OK, REQUEST_FAILED, labelled,
};
use crate::notify::Notifier;
use crate::outcome::{KeyValuePair, Outcome, pairs_of, settle_mutation};
use crate::single::parse_ttl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListId {
    Mset,
    Mget,
    Mdelete,
}

impl ListId {
    pub const ALL: [ListId; 3] = [ListId::Mset, ListId::Mget, ListId::Mdelete];

    pub fn kind(self) -> ListKind {
        match self {
            Self::Mset => ListKind::KeyValue,
            Self::Mget | Self::Mdelete => ListKind::KeyOnly,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mset => "mset",
            Self::Mget => "mget",
            Self::Mdelete => "mdelete",
        }
    }
}

impl FromStr for ListId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|list| list.as_str() == value)
            .ok_or_else(|| format!("unknown list: {value}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MgetRegion {
    Entries {
        count: u64,
        entries: Vec<KeyValuePair>,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchView {
    pub mset: FieldList,
    pub mset_ttl: String,
    pub mget: FieldList,
    pub mdelete: FieldList,
    pub mget_result: Option<MgetRegion>,
}

impl Default for BatchView {
    fn default() -> Self {
        Self {
            mset: FieldList::new(ListId::Mset.kind()),
            mset_ttl: String::new(),
            mget: FieldList::new(ListId::Mget.kind()),
            mdelete: FieldList::new(ListId::Mdelete.kind()),
            mget_result: None,
        }
    }
}

impl BatchView {
    pub fn list(&self, list: ListId) -> &FieldList {
        match list {
            ListId::Mset => &self.mset,
            ListId::Mget => &self.mget,
            ListId::Mdelete => &self.mdelete,
        }
    }

    fn list_mut(&mut self, list: ListId) -> &mut FieldList {
        match list {
            ListId::Mset => &mut self.mset,
            ListId::Mget => &mut self.mget,
            ListId::Mdelete => &mut self.mdelete,
        }
    }
}

pub fn build_mset_request(rows: &[FieldRow], ttl: &str) -> MsetRequest {
    MsetRequest {
        kvs: reduce_entries(rows),
        ttl: parse_ttl(ttl),
    }
}

pub fn build_keys_request(rows: &[FieldRow]) -> KeysRequest {
    KeysRequest {
        keys: reduce_keys(rows),
    }
}

/// mset, mget and mdelete over three dynamic field lists.
pub struct BatchController<S> {
    service: Arc<S>,
    notifier: Notifier,
    state: Arc<Mutex<BatchView>>,
}

impl<S> Clone for BatchController<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            notifier: self.notifier.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: KvApi> BatchController<S> {
    pub fn new(service: Arc<S>, notifier: Notifier) -> Self {
        Self {
            service,
            notifier,
            state: Arc::new(Mutex::new(BatchView::default())),
        }
    }

    pub async fn view(&self) -> BatchView {
        self.state.lock().await.clone()
    }

    pub async fn add_row(&self, list: ListId) -> RowId {
        self.state.lock().await.list_mut(list).add_row()
    }

    pub async fn remove_row(&self, list: ListId, row: RowId) -> bool {
        self.state.lock().await.list_mut(list).remove_row(row)
    }

    pub async fn set_key(&self, list: ListId, row: RowId, key: impl Into<String>) -> bool {
        self.state.lock().await.list_mut(list).set_key(row, key)
    }

    pub async fn set_value(&self, list: ListId, row: RowId, value: impl Into<String>) -> bool {
        self.state.lock().await.list_mut(list).set_value(row, value)
    }

    pub async fn set_mset_ttl(&self, ttl: impl Into<String>) {
        self.state.lock().await.mset_ttl = ttl.into();
    }

    pub async fn collect(&self, list: ListId) -> Vec<FieldRow> {
        self.state.lock().await.list(list).collect()
    }

    pub async fn reset(&self, list: ListId) {
        let mut state = self.state.lock().await;
        state.list_mut(list).reset();
        if list == ListId::Mset {
            state.mset_ttl.clear();
        }
    }

    /// Sends every complete row of the mset list. An empty mapping is still
    /// sent; the service decides what that means.
    pub async fn mset(&self) -> Outcome {
        let request = {
            let state = self.state.lock().await;
            build_mset_request(&state.mset.collect(), &state.mset_ttl)
        };
        info!(entries = request.kvs.len(), ttl = ?request.ttl, "submitting mset");

        let outcome = settle_mutation(
            "mset",
            self.service.mset(&request).await,
            MSET_OK,
            MSET_FAILED,
        );
        if outcome.is_success() {
            self.reset(ListId::Mset).await;
        }

        self.notifier.show(outcome.kind, outcome.text.clone()).await;
        outcome
    }

    pub async fn mget(&self) -> MgetRegion {
        let request = build_keys_request(&self.collect(ListId::Mget).await);

        let region = match self.service.mget(&request).await {
            Ok(reply) => match reply.error.clone() {
                Some(message) => {
                    warn!(error = %message, "batch lookup failed");
                    MgetRegion::Error { message }
                }
                None => {
                    let entries = pairs_of(&reply);
                    info!(
                        keys = request.keys.len(),
                        found = entries.len(),
                        "batch lookup succeeded"
                    );
                    MgetRegion::Entries {
                        count: reply.count.unwrap_or(entries.len() as u64),
                        entries,
                    }
                }
            },
            Err(err) => {
                error!(error = %err, "batch lookup request failed");
                MgetRegion::Error {
                    message: labelled(REQUEST_FAILED, &err),
                }
            }
        };

        self.state.lock().await.mget_result = Some(region.clone());
        region
    }

    pub async fn mdelete(&self) -> Outcome {
        let request = build_keys_request(&self.collect(ListId::Mdelete).await);
        info!(keys = request.keys.len(), "submitting mdelete");

        let outcome = settle_mutation(
            "mdelete",
            self.service.mdelete(&request).await,
            MDELETE_OK,
            MDELETE_FAILED,
        );
        if outcome.is_success() {
            self.reset(ListId::Mdelete).await;
        }

        self.notifier.show(outcome.kind, outcome.text.clone()).await;
        outcome
    }
}
