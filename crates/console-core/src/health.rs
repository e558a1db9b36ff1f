use std::sync::Arc;

use client_sdk::KvApi;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::messages::{HEALTH_ERROR, HEALTHY, SERVICE_UNREACHABLE, UNHEALTHY, labelled};
use crate::notify::NoticeKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum HealthState {
    Healthy { message: String },
    Unhealthy { message: String },
    Unreachable { error: String },
}

impl HealthState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Healthy { .. } => HEALTHY,
            Self::Unhealthy { .. } => UNHEALTHY,
            Self::Unreachable { .. } => HEALTH_ERROR,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::Healthy { message } | Self::Unhealthy { message } => message.clone(),
            Self::Unreachable { error } => labelled(SERVICE_UNREACHABLE, error),
        }
    }

    pub fn kind(&self) -> NoticeKind {
        match self {
            Self::Healthy { .. } => NoticeKind::Success,
            Self::Unhealthy { .. } | Self::Unreachable { .. } => NoticeKind::Danger,
        }
    }
}

/// Polls `/health`. Nothing is shown until the first check settles.
pub struct HealthController<S> {
    service: Arc<S>,
    state: Arc<Mutex<Option<HealthState>>>,
}

impl<S> Clone for HealthController<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: KvApi> HealthController<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            state: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn current(&self) -> Option<HealthState> {
        self.state.lock().await.clone()
    }

    pub async fn check(&self) -> HealthState {
        let state = match self.service.health().await {
            Ok(report) if report.is_healthy() => {
                info!(message = %report.message, "service healthy");
                HealthState::Healthy {
                    message: report.message,
                }
            }
            Ok(report) => {
                warn!(status = %report.status, message = %report.message, "service unhealthy");
                HealthState::Unhealthy {
                    message: report.message,
                }
            }
            Err(err) => {
                error!(error = %err, "health check failed");
                HealthState::Unreachable {
                    error: err.to_string(),
                }
            }
        };

        *self.state.lock().await = Some(state.clone());
        state
    }
}
