use std::sync::Arc;

use client_sdk::{KvApi, ServiceClient};
use serde::Serialize;
use tracing::info;

use crate::batch::{BatchController, BatchView};
use crate::config::ConsoleConfig;
use crate::health::{HealthController, HealthState};
use crate::notify::{Notification, Notifier};
use crate::scan::{ScanController, ScanView};
use crate::service_config::{ConfigController, ConfigView};
use crate::single::{SingleKeyController, SingleKeyView};
use crate::tabs::{Tab, TabController};

/// Everything a rendering surface needs to draw the console once.
#[derive(Debug, Clone, Serialize)]
pub struct ConsoleView {
    pub active_tab: Tab,
    pub notification: Option<Notification>,
    pub health: Option<HealthState>,
    pub single: SingleKeyView,
    pub batch: BatchView,
    pub scan: ScanView,
    pub config: ConfigView,
}

/// Handle to a running console. Cloning shares all controller state.
pub struct AppHandle<S = ServiceClient> {
    config: ConsoleConfig,
    notifier: Notifier,
    single: SingleKeyController<S>,
    batch: BatchController<S>,
    scan: ScanController<S>,
    settings: ConfigController<S>,
    health: HealthController<S>,
    tabs: TabController,
}

impl<S> Clone for AppHandle<S> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            notifier: self.notifier.clone(),
            single: self.single.clone(),
            batch: self.batch.clone(),
            scan: self.scan.clone(),
            settings: self.settings.clone(),
            health: self.health.clone(),
            tabs: self.tabs.clone(),
        }
    }
}

/// Builds the console against `config.service_url` and runs the startup
/// health check and config fetch.
pub async fn initialize(config: ConsoleConfig) -> AppHandle {
    let service = ServiceClient::new(config.service_url.clone());
    AppHandle::launch(service, config).await
}

impl<S: KvApi> AppHandle<S> {
    /// Wires the components leaf-first without touching the service.
    pub fn new(service: S, config: ConsoleConfig) -> Self {
        Self::with_shared(Arc::new(service), config)
    }

    pub fn with_shared(service: Arc<S>, config: ConsoleConfig) -> Self {
        let notifier = Notifier::new(config.notification_ttl);
        Self {
            single: SingleKeyController::new(Arc::clone(&service), notifier.clone()),
            batch: BatchController::new(Arc::clone(&service), notifier.clone()),
            scan: ScanController::new(Arc::clone(&service)),
            settings: ConfigController::new(Arc::clone(&service)),
            health: HealthController::new(service),
            tabs: TabController::new(),
            notifier,
            config,
        }
    }

    pub async fn launch(service: S, config: ConsoleConfig) -> Self {
        let app = Self::new(service, config);
        app.start().await;
        app
    }

    /// Startup work: one health check and the initial config snapshot, issued
    /// concurrently.
    pub async fn start(&self) {
        let (health, _) = tokio::join!(self.health.check(), self.settings.refresh());
        info!(
            service_url = %self.config.service_url,
            health = health.label(),
            "console initialized"
        );
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn single(&self) -> &SingleKeyController<S> {
        &self.single
    }

    pub fn batch(&self) -> &BatchController<S> {
        &self.batch
    }

    pub fn scan(&self) -> &ScanController<S> {
        &self.scan
    }

    pub fn settings(&self) -> &ConfigController<S> {
        &self.settings
    }

    pub fn health(&self) -> &HealthController<S> {
        &self.health
    }

    pub fn tabs(&self) -> &TabController {
        &self.tabs
    }

    pub async fn view(&self) -> ConsoleView {
        ConsoleView {
            active_tab: self.tabs.active().await,
            notification: self.notifier.current().await,
            health: self.health.current().await,
            single: self.single.view().await,
            batch: self.batch.view().await,
            scan: self.scan.view().await,
            config: self.settings.view().await,
        }
    }
}
