use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use console_core::{AppHandle, ConfigForm, ListId, RowId, ScanMode, SetForm, Tab};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::render_console;

/// Hosts the console: `GET /` renders the current state and every form posts
/// back into a controller, then redirects to `/`.
pub fn router(app: AppHandle) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/tabs/{tab}", post(activate_tab))
        .route("/health/check", post(check_health))
        .route("/single/set", post(single_set))
        .route("/single/get", post(single_get))
        .route("/single/delete", post(single_delete))
        .route("/batch/{list}", post(batch_action))
        .route("/scan", post(scan))
        .route("/config", post(update_config))
        .route("/api/view", get(view_json))
        .route(
            "/api/ping",
            get(|| async {
                Json(serde_json::json!({
                    "ok": true,
                    "service": "kvconsole-web"
                }))
            }),
        )
        .with_state(app)
}

async fn index(State(app): State<AppHandle>) -> Html<String> {
    Html(render_console(&app.view().await))
}

async fn view_json(State(app): State<AppHandle>) -> impl IntoResponse {
    Json(app.view().await)
}

async fn activate_tab(State(app): State<AppHandle>, Path(tab): Path<Tab>) -> Redirect {
    app.tabs().activate(tab).await;
    Redirect::to("/")
}

async fn check_health(State(app): State<AppHandle>) -> Redirect {
    app.health().check().await;
    Redirect::to("/")
}

async fn single_set(State(app): State<AppHandle>, Form(form): Form<SetForm>) -> Redirect {
    app.single().set(form).await;
    Redirect::to("/")
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct KeyForm {
    key: String,
}

async fn single_get(State(app): State<AppHandle>, Form(form): Form<KeyForm>) -> Redirect {
    app.single().get(form.key).await;
    Redirect::to("/")
}

async fn single_delete(State(app): State<AppHandle>, Form(form): Form<KeyForm>) -> Redirect {
    app.single().delete(form.key).await;
    Redirect::to("/")
}

/// What a batch form submission asks for, carried in its `action` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchAction {
    Add,
    Remove(RowId),
    Submit,
}

fn parse_batch_action(raw: &str) -> Option<BatchAction> {
    match raw {
        "add" => Some(BatchAction::Add),
        "submit" => Some(BatchAction::Submit),
        other => other
            .strip_prefix("remove-")
            .and_then(|id| id.parse::<u64>().ok())
            .map(|id| BatchAction::Remove(RowId::from(id))),
    }
}

/// Syncs every posted row input into the list, then performs the action.
async fn batch_action(
    State(app): State<AppHandle>,
    Path(list): Path<ListId>,
    Form(fields): Form<HashMap<String, String>>,
) -> Redirect {
    let batch = app.batch();
    let rows = batch.view().await.list(list).rows().to_vec();
    for row in rows {
        if let Some(key) = fields.get(&format!("key-{}", row.id)) {
            batch.set_key(list, row.id, key.as_str()).await;
        }
        if let Some(value) = fields.get(&format!("value-{}", row.id)) {
            batch.set_value(list, row.id, value.as_str()).await;
        }
    }
    if list == ListId::Mset
        && let Some(ttl) = fields.get("ttl")
    {
        batch.set_mset_ttl(ttl.as_str()).await;
    }

    let action = fields.get("action").map(String::as_str).unwrap_or("submit");
    match parse_batch_action(action) {
        Some(BatchAction::Add) => {
            let row = batch.add_row(list).await;
            debug!(list = list.as_str(), %row, "row added");
        }
        Some(BatchAction::Remove(row)) => {
            let removed = batch.remove_row(list, row).await;
            debug!(list = list.as_str(), %row, removed, "row remove requested");
        }
        Some(BatchAction::Submit) => match list {
            ListId::Mset => {
                batch.mset().await;
            }
            ListId::Mget => {
                batch.mget().await;
            }
            ListId::Mdelete => {
                batch.mdelete().await;
            }
        },
        None => warn!(list = list.as_str(), action, "unknown batch action"),
    }

    Redirect::to("/")
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScanForm {
    prefix: String,
    mode: ScanMode,
}

async fn scan(State(app): State<AppHandle>, Form(form): Form<ScanForm>) -> Redirect {
    app.scan().run(form.prefix, form.mode).await;
    Redirect::to("/")
}

async fn update_config(State(app): State<AppHandle>, Form(form): Form<ConfigForm>) -> Redirect {
    app.settings().update(form).await;
    Redirect::to("/")
}
