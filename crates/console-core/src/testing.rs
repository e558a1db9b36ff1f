//! Scripted in-memory `KvApi` for controller tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use client_sdk::{CallError, CallResult, KvApi};
use common::{
    ConfigUpdate, EntriesReply, HealthReport, KeysRequest, MsetRequest, MutationReply, SetRequest,
    ValueReply,
};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Health,
    Set(SetRequest),
    Get(String),
    Delete(String),
    Mset(MsetRequest),
    Mget(KeysRequest),
    Mdelete(KeysRequest),
    Scan(String),
    Config,
    UpdateConfig(ConfigUpdate),
}

#[derive(Default)]
pub struct FakeService {
    calls: Mutex<Vec<Call>>,
    health: Mutex<VecDeque<CallResult<HealthReport>>>,
    mutations: Mutex<VecDeque<CallResult<MutationReply>>>,
    values: Mutex<VecDeque<CallResult<ValueReply>>>,
    entries: Mutex<VecDeque<CallResult<EntriesReply>>>,
    configs: Mutex<VecDeque<CallResult<Value>>>,
}

impl FakeService {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn push_health(&self, reply: CallResult<HealthReport>) {
        self.health.lock().unwrap().push_back(reply);
    }

    pub fn push_mutation(&self, reply: CallResult<MutationReply>) {
        self.mutations.lock().unwrap().push_back(reply);
    }

    pub fn push_value(&self, reply: CallResult<ValueReply>) {
        self.values.lock().unwrap().push_back(reply);
    }

    pub fn push_entries(&self, reply: CallResult<EntriesReply>) {
        self.entries.lock().unwrap().push_back(reply);
    }

    pub fn push_config(&self, reply: CallResult<Value>) {
        self.configs.lock().unwrap().push_back(reply);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn next<T>(queue: &Mutex<VecDeque<CallResult<T>>>) -> CallResult<T> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(CallError::Unreachable("no scripted reply".to_string())))
}

pub fn unreachable(message: &str) -> CallError {
    CallError::Unreachable(message.to_string())
}

impl KvApi for FakeService {
    async fn health(&self) -> CallResult<HealthReport> {
        self.record(Call::Health);
        next(&self.health)
    }

    async fn set(&self, request: &SetRequest) -> CallResult<MutationReply> {
        self.record(Call::Set(request.clone()));
        next(&self.mutations)
    }

    async fn get(&self, key: &str) -> CallResult<ValueReply> {
        self.record(Call::Get(key.to_string()));
        next(&self.values)
    }

    async fn delete(&self, key: &str) -> CallResult<MutationReply> {
        self.record(Call::Delete(key.to_string()));
        next(&self.mutations)
    }

    async fn mset(&self, request: &MsetRequest) -> CallResult<MutationReply> {
        self.record(Call::Mset(request.clone()));
        next(&self.mutations)
    }

    async fn mget(&self, request: &KeysRequest) -> CallResult<EntriesReply> {
        self.record(Call::Mget(request.clone()));
        next(&self.entries)
    }

    async fn mdelete(&self, request: &KeysRequest) -> CallResult<MutationReply> {
        self.record(Call::Mdelete(request.clone()));
        next(&self.mutations)
    }

    async fn scan(&self, prefix: &str) -> CallResult<EntriesReply> {
        self.record(Call::Scan(prefix.to_string()));
        next(&self.entries)
    }

    async fn config(&self) -> CallResult<Value> {
        self.record(Call::Config);
        next(&self.configs)
    }

    async fn update_config(&self, update: &ConfigUpdate) -> CallResult<MutationReply> {
        self.record(Call::UpdateConfig(update.clone()));
        next(&self.mutations)
    }
}
