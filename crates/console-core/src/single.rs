use std::sync::Arc;

use client_sdk::KvApi;
use common::SetRequest;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::messages::{
    DELETE_FAILED, DELETE_OK, KEY_REQUIRED, REQUEST_FAILED, SET_FAILED, SET_OK, labelled,
};
use crate::notify::Notifier;
use crate::outcome::{Outcome, settle_mutation};

/// The set form as typed by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetForm {
    pub key: String,
    pub value: String,
    pub ttl: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GetRegion {
    Value { key: String, value: String },
    Error { message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SingleKeyView {
    pub set_form: SetForm,
    pub get_key: String,
    pub get_result: Option<GetRegion>,
    pub delete_key: String,
}

/// TTL in seconds when the input is a positive integer.
pub fn parse_ttl(input: &str) -> Option<u64> {
    input.trim().parse::<u64>().ok().filter(|ttl| *ttl > 0)
}

pub fn build_set_request(form: &SetForm) -> SetRequest {
    SetRequest {
        key: form.key.clone(),
        value: form.value.clone(),
        ttl: parse_ttl(&form.ttl),
    }
}

pub struct SingleKeyController<S> {
    service: Arc<S>,
    notifier: Notifier,
    state: Arc<Mutex<SingleKeyView>>,
}

impl<S> Clone for SingleKeyController<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            notifier: self.notifier.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: KvApi> SingleKeyController<S> {
    pub fn new(service: Arc<S>, notifier: Notifier) -> Self {
        Self {
            service,
            notifier,
            state: Arc::new(Mutex::new(SingleKeyView::default())),
        }
    }

    pub async fn view(&self) -> SingleKeyView {
        self.state.lock().await.clone()
    }

    /// Creates or overwrites one key. The form is cleared on success and kept
    /// for correction otherwise.
    pub async fn set(&self, form: SetForm) -> Outcome {
        let request = build_set_request(&form);
        self.state.lock().await.set_form = form;

        let outcome = settle_mutation(
            "set",
            self.service.set(&request).await,
            SET_OK,
            SET_FAILED,
        );
        if outcome.is_success() {
            self.state.lock().await.set_form = SetForm::default();
        }

        self.notifier.show(outcome.kind, outcome.text.clone()).await;
        outcome
    }

    /// Looks up one key and replaces the get result region with the value or
    /// the error. An empty key is rejected without a request.
    pub async fn get(&self, key: impl Into<String>) -> GetRegion {
        let key = key.into();
        self.state.lock().await.get_key = key.clone();

        let region = if key.is_empty() {
            GetRegion::Error {
                message: KEY_REQUIRED.to_string(),
            }
        } else {
            match self.service.get(&key).await {
                Ok(reply) => match reply.error {
                    Some(message) => {
                        warn!(key = %key, error = %message, "lookup failed");
                        GetRegion::Error { message }
                    }
                    None => {
                        info!(key = %key, "lookup succeeded");
                        GetRegion::Value {
                            key,
                            value: reply.value.unwrap_or_default(),
                        }
                    }
                },
                Err(err) => {
                    error!(key = %key, error = %err, "lookup request failed");
                    GetRegion::Error {
                        message: labelled(REQUEST_FAILED, &err),
                    }
                }
            }
        };

        self.state.lock().await.get_result = Some(region.clone());
        region
    }

    pub async fn delete(&self, key: impl Into<String>) -> Outcome {
        let key = key.into();
        self.state.lock().await.delete_key = key.clone();

        let outcome = if key.is_empty() {
            Outcome::danger(KEY_REQUIRED)
        } else {
            let outcome = settle_mutation(
                "delete",
                self.service.delete(&key).await,
                DELETE_OK,
                DELETE_FAILED,
            );
            if outcome.is_success() {
                self.state.lock().await.delete_key.clear();
            }
            outcome
        };

        self.notifier.show(outcome.kind, outcome.text.clone()).await;
        outcome
    }
}
