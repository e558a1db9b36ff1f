use client_sdk::CallResult;
use common::{EntriesReply, MutationReply};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::messages::{REQUEST_FAILED, labelled};
use crate::notify::NoticeKind;

/// How an operation settled, as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub kind: NoticeKind,
    pub text: String,
}

impl Outcome {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn danger(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Danger,
            text: text.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NoticeKind::Success
    }
}

/// Maps a mutating call's result onto the three error classes:
/// `success:true`, domain failure, transport failure.
pub(crate) fn settle_mutation(
    operation: &'static str,
    result: CallResult<MutationReply>,
    ok_label: &str,
    failed_label: &str,
) -> Outcome {
    match result {
        Ok(reply) if reply.success => {
            info!(operation, message = reply.message_text(), "operation succeeded");
            Outcome::success(labelled(ok_label, reply.message_text()))
        }
        Ok(reply) => {
            warn!(operation, error = reply.error_text(), "service rejected operation");
            Outcome::danger(labelled(failed_label, reply.error_text()))
        }
        Err(err) => {
            error!(operation, error = %err, "request failed");
            Outcome::danger(labelled(REQUEST_FAILED, &err))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyValuePair {
    pub key: String,
    pub value: String,
}

pub(crate) fn pairs_of(reply: &EntriesReply) -> Vec<KeyValuePair> {
    reply
        .pairs()
        .into_iter()
        .map(|(key, value)| KeyValuePair { key, value })
        .collect()
}
