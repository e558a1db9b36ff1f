use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Single,
    Batch,
    Scan,
    Config,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Single, Tab::Batch, Tab::Scan, Tab::Config];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Batch => "batch",
            Self::Scan => "scan",
            Self::Config => "config",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Single => "单个操作",
            Self::Batch => "批量操作",
            Self::Scan => "扫描",
            Self::Config => "配置管理",
        }
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tab| tab.as_str() == value)
            .ok_or_else(|| format!("unknown tab: {value}"))
    }
}

/// Exactly one panel is visible at a time.
#[derive(Clone, Default)]
pub struct TabController {
    active: Arc<Mutex<Tab>>,
}

impl TabController {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn activate(&self, tab: Tab) {
        *self.active.lock().await = tab;
    }

    pub async fn active(&self) -> Tab {
        *self.active.lock().await
    }

    pub async fn is_visible(&self, tab: Tab) -> bool {
        self.active().await == tab
    }
}
