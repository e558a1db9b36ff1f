//! Request orchestration and form state for the key-value service console.
//!
//! Controllers read their form state, build a request payload, issue one
//! independent call through [`client_sdk::KvApi`] and write the settled result
//! back into their own region or the shared [`notify::Notifier`]. No ordering
//! is imposed between calls: when two calls for the same region are in flight
//! the one that settles last wins.

pub mod app;
pub mod batch;
pub mod config;
pub mod field_list;
pub mod health;
pub mod messages;
pub mod notify;
pub mod outcome;
pub mod scan;
pub mod service_config;
pub mod single;
pub mod tabs;

#[cfg(test)]
mod testing;

pub use app::{AppHandle, ConsoleView, initialize};
pub use batch::{BatchController, BatchView, ListId, MgetRegion};
pub use config::ConsoleConfig;
pub use field_list::{FieldList, FieldRow, ListKind, Row, RowId};
pub use health::{HealthController, HealthState};
pub use notify::{NoticeKind, Notification, NotificationId, Notifier};
pub use outcome::{KeyValuePair, Outcome};
pub use scan::{ScanController, ScanMode, ScanRegion, ScanView};
pub use service_config::{ConfigController, ConfigForm, ConfigView, SnapshotRegion};
pub use single::{GetRegion, SetForm, SingleKeyController, SingleKeyView};
pub use tabs::{Tab, TabController};
