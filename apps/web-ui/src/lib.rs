use std::fmt::Write as _;

use console_core::{
    BatchView, ConsoleView, GetRegion, HealthState, ListId, MgetRegion, Notification, Row,
    ScanRegion, SnapshotRegion, Tab,
};

mod routes;

pub use routes::router;

const STYLE: &str = r#"
        body { font-family: system-ui, sans-serif; margin: 1.5rem; background: #fafafa; }
        main { max-width: 960px; margin: 0 auto; }
        nav { display: flex; gap: 0.5rem; margin-bottom: 1rem; }
        nav form { margin: 0; }
        section { background: #fff; border: 1px solid #ddd; border-radius: 8px; padding: 1rem; margin-bottom: 1rem; }
        h1, h2, h3 { margin-top: 0; }
        label { display: block; margin: 0.4rem 0 0.2rem; font-weight: 600; }
        input, textarea, button { font: inherit; }
        input, textarea { width: 100%; padding: 0.5rem; border: 1px solid #ccc; border-radius: 6px; box-sizing: border-box; }
        .row { display: grid; grid-template-columns: 1fr 1fr; gap: 0.75rem; }
        .field-row { display: flex; gap: 0.5rem; margin-bottom: 0.4rem; }
        .actions { margin-top: 0.6rem; display: flex; gap: 0.5rem; flex-wrap: wrap; }
        button { padding: 0.5rem 0.8rem; border: 1px solid #888; border-radius: 6px; background: #f5f5f5; cursor: pointer; }
        button.active { background: #333; color: #fff; }
        pre { background: #111; color: #f2f2f2; padding: 0.8rem; border-radius: 6px; overflow: auto; white-space: pre-wrap; }
        table { width: 100%; border-collapse: collapse; }
        td, th { border-bottom: 1px solid #ddd; padding: 0.4rem; text-align: left; vertical-align: top; }
        .default-submit { position: absolute; left: -9999px; width: 1px; height: 1px; overflow: hidden; }
        .alert { padding: 0.6rem 0.8rem; border-radius: 6px; }
        .alert-success { background: #e6f4ea; color: #1e6b34; }
        .alert-danger { background: #fdecea; color: #8a1c1c; }
        #result { position: fixed; top: 1rem; right: 1rem; max-width: 28rem; z-index: 10; }
        .status-success { color: #1e6b34; }
        .status-danger { color: #8a1c1c; }
        .hidden { display: none; }
"#;

/// Escapes text for use in HTML element content and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn alert(kind: &str, text: &str) -> String {
    format!(
        "<div class=\"alert alert-{kind}\">{}</div>",
        escape_html(text)
    )
}

fn input(id: &str, name: &str, label: &str, value: &str, placeholder: &str) -> String {
    format!(
        "<label for=\"{id}\">{label}</label>\n<input id=\"{id}\" name=\"{name}\" value=\"{}\" placeholder=\"{placeholder}\" />\n",
        escape_html(value)
    )
}

fn panel_class(view: &ConsoleView, tab: Tab) -> &'static str {
    if view.active_tab == tab { "" } else { "hidden" }
}

/// The whole console page for one view snapshot.
pub fn render_console(view: &ConsoleView) -> String {
    let mut body = String::new();

    body.push_str(&render_notification(view.notification.as_ref()));
    body.push_str(&render_nav(view.active_tab));
    body.push_str(&render_health(view.health.as_ref()));

    let _ = write!(
        body,
        "<div id=\"single\" class=\"tab-content {}\">{}</div>\n",
        panel_class(view, Tab::Single),
        render_single(view)
    );
    let _ = write!(
        body,
        "<div id=\"batch\" class=\"tab-content {}\">{}</div>\n",
        panel_class(view, Tab::Batch),
        render_batch(view)
    );
    let _ = write!(
        body,
        "<div id=\"scan\" class=\"tab-content {}\">{}</div>\n",
        panel_class(view, Tab::Scan),
        render_scan(view)
    );
    let _ = write!(
        body,
        "<div id=\"config\" class=\"tab-content {}\">{}</div>\n",
        panel_class(view, Tab::Config),
        render_config(view)
    );

    format!(
        r#"<!doctype html>
<html lang="zh-CN">
<head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>KV 管理控制台</title>
    <style>{STYLE}</style>
</head>
<body>
    <main>
        <h1>KV 管理控制台</h1>
{body}
    </main>
</body>
</html>
"#
    )
}

pub fn render_notification(notification: Option<&Notification>) -> String {
    match notification {
        Some(notification) => format!(
            "<div id=\"result\" class=\"alert alert-{}\">{}</div>\n<script>setTimeout(function () {{ document.getElementById('result').classList.add('hidden'); }}, {});</script>\n",
            notification.kind.as_str(),
            escape_html(&notification.text),
            notification.remaining_ms
        ),
        None => "<div id=\"result\" class=\"hidden\"></div>\n".to_string(),
    }
}

fn render_nav(active: Tab) -> String {
    let mut nav = String::from("<nav>\n");
    for tab in Tab::ALL {
        let class = if tab == active { "active" } else { "" };
        let _ = writeln!(
            nav,
            "<form method=\"post\" action=\"/tabs/{}\"><button class=\"nav-link {class}\" data-tab=\"{}\">{}</button></form>",
            tab.as_str(),
            tab.as_str(),
            tab.title()
        );
    }
    nav.push_str("</nav>\n");
    nav
}

pub fn render_health(health: Option<&HealthState>) -> String {
    let (status, detail) = match health {
        Some(state) => {
            let kind = state.kind().as_str();
            (
                format!(
                    "<p id=\"health-status\" class=\"status-{kind}\">{}</p>",
                    state.label()
                ),
                format!(
                    "<div id=\"health-message\" class=\"alert alert-{kind}\">{}</div>",
                    escape_html(&state.detail())
                ),
            )
        }
        None => (
            "<p id=\"health-status\">…</p>".to_string(),
            "<div id=\"health-message\" class=\"hidden\"></div>".to_string(),
        ),
    };

    format!(
        "<section>\n<h2>服务健康</h2>\n{status}\n{detail}\n<form method=\"post\" action=\"/health/check\" class=\"actions\"><button id=\"health-check-btn\">检查</button></form>\n</section>\n"
    )
}

fn render_single(view: &ConsoleView) -> String {
    let single = &view.single;
    let mut html = String::new();

    let _ = write!(
        html,
        "<section>\n<h2>设置键值</h2>\n<form id=\"set-form\" method=\"post\" action=\"/single/set\">\n{}{}{}<div class=\"actions\"><button>设置</button></div>\n</form>\n</section>\n",
        input("set-key", "key", "键", &single.set_form.key, "key"),
        input("set-value", "value", "值", &single.set_form.value, "value"),
        input("set-ttl", "ttl", "TTL (秒)", &single.set_form.ttl, "可选"),
    );

    let _ = write!(
        html,
        "<section>\n<h2>获取值</h2>\n<form id=\"get-form\" method=\"post\" action=\"/single/get\">\n{}<div class=\"actions\"><button>获取</button></div>\n</form>\n{}</section>\n",
        input("get-key", "key", "键", &single.get_key, "key"),
        render_get_result(single.get_result.as_ref()),
    );

    let _ = write!(
        html,
        "<section>\n<h2>删除键值</h2>\n<form id=\"delete-form\" method=\"post\" action=\"/single/delete\">\n{}<div class=\"actions\"><button>删除</button></div>\n</form>\n</section>\n",
        input("delete-key", "key", "键", &single.delete_key, "key"),
    );

    html
}

pub fn render_get_result(region: Option<&GetRegion>) -> String {
    match region {
        None => "<div id=\"get-result\" class=\"hidden\"></div>\n".to_string(),
        Some(GetRegion::Error { message }) => {
            format!("<div id=\"get-result\">{}</div>\n", alert("danger", message))
        }
        Some(GetRegion::Value { key, value }) => format!(
            "<div id=\"get-result\">\n<p>键: {}</p>\n<p>值:</p>\n<pre>{}</pre>\n</div>\n",
            escape_html(key),
            escape_html(value)
        ),
    }
}

fn render_rows(list: ListId, rows: &[Row]) -> String {
    let mut html = format!("<div id=\"{}-rows\">\n", list.as_str());
    for row in rows {
        let id = row.id;
        let _ = write!(
            html,
            "<div class=\"field-row\"><input name=\"key-{id}\" value=\"{}\" placeholder=\"键\" />",
            escape_html(row.field.key())
        );
        if let Some(value) = row.field.value() {
            let _ = write!(
                html,
                "<input name=\"value-{id}\" value=\"{}\" placeholder=\"值\" />",
                escape_html(value)
            );
        }
        let _ = writeln!(
            html,
            "<button name=\"action\" value=\"remove-{id}\">✕</button></div>"
        );
    }
    html.push_str("</div>\n");
    html
}

/// Opens a batch list section; the caller closes it. The off-screen submit
/// button comes first so Enter in any row submits instead of removing a row.
fn render_list_form(batch: &BatchView, list: ListId, title: &str, submit: &str) -> String {
    let rows = render_rows(list, batch.list(list).rows());
    let ttl = if list == ListId::Mset {
        input("mset-ttl", "ttl", "TTL (秒)", &batch.mset_ttl, "可选")
    } else {
        String::new()
    };

    format!(
        "<section>\n<h2>{title}</h2>\n<form id=\"{name}-form\" method=\"post\" action=\"/batch/{name}\">\n<button class=\"default-submit\" name=\"action\" value=\"submit\" tabindex=\"-1\" aria-hidden=\"true\"></button>\n{rows}{ttl}<div class=\"actions\"><button name=\"action\" value=\"add\">添加</button><button name=\"action\" value=\"submit\">{submit}</button></div>\n</form>\n",
        name = list.as_str(),
    )
}

fn render_batch(view: &ConsoleView) -> String {
    let mut html = String::new();
    html.push_str(&render_list_form(&view.batch, ListId::Mset, "批量设置", "批量设置"));
    html.push_str("</section>\n");
    html.push_str(&render_list_form(&view.batch, ListId::Mget, "批量获取", "批量获取"));
    html.push_str(&render_mget_result(view.batch.mget_result.as_ref()));
    html.push_str("</section>\n");
    html.push_str(&render_list_form(
        &view.batch,
        ListId::Mdelete,
        "批量删除",
        "批量删除",
    ));
    html.push_str("</section>\n");
    html
}

pub fn render_mget_result(region: Option<&MgetRegion>) -> String {
    match region {
        None => "<div id=\"mget-result\" class=\"hidden\"></div>\n".to_string(),
        Some(MgetRegion::Error { message }) => {
            format!("<div id=\"mget-result\">{}</div>\n", alert("danger", message))
        }
        Some(MgetRegion::Entries { count, entries }) => {
            let mut html =
                format!("<div id=\"mget-result\">\n<p>获取结果 ({count} 个键):</p>\n");
            for entry in entries {
                let _ = writeln!(
                    html,
                    "<div class=\"entry\"><p>键: {}</p><pre>{}</pre></div>",
                    escape_html(&entry.key),
                    escape_html(&entry.value)
                );
            }
            html.push_str("</div>\n");
            html
        }
    }
}

fn render_scan(view: &ConsoleView) -> String {
    format!(
        "<section>\n<h2>前缀扫描</h2>\n<form id=\"scan-form\" method=\"post\" action=\"/scan\">\n{}<div class=\"actions\"><button name=\"mode\" value=\"table\">扫描</button><button id=\"scan-keys-btn\" name=\"mode\" value=\"keys_only\">只扫描键</button></div>\n</form>\n{}</section>\n",
        input("scan-prefix", "prefix", "前缀", &view.scan.prefix, "留空匹配全部"),
        render_scan_result(view.scan.result.as_ref()),
    )
}

pub fn render_scan_result(region: Option<&ScanRegion>) -> String {
    match region {
        None => "<div id=\"scan-result\" class=\"hidden\"></div>\n".to_string(),
        Some(ScanRegion::Error { message }) => {
            format!("<div id=\"scan-result\">{}</div>\n", alert("danger", message))
        }
        Some(ScanRegion::Table { count, rows }) => {
            let mut html = format!(
                "<div id=\"scan-result\">\n<p>扫描结果 ({count} 个键值对):</p>\n<table>\n<thead><tr><th>键</th><th>值</th></tr></thead>\n<tbody>\n"
            );
            for row in rows {
                let _ = writeln!(
                    html,
                    "<tr><td>{}</td><td><pre>{}</pre></td></tr>",
                    escape_html(&row.key),
                    escape_html(&row.value)
                );
            }
            html.push_str("</tbody>\n</table>\n</div>\n");
            html
        }
        Some(ScanRegion::Keys { keys }) => {
            let mut html = format!(
                "<div id=\"scan-result\">\n<p>扫描结果 ({} 个键):</p>\n<ul>\n",
                keys.len()
            );
            for key in keys {
                let _ = writeln!(html, "<li>{}</li>", escape_html(key));
            }
            html.push_str("</ul>\n</div>\n");
            html
        }
    }
}

fn render_config(view: &ConsoleView) -> String {
    let config = &view.config;
    let snapshot = match &config.snapshot {
        SnapshotRegion::Loading => "<p>加载中...</p>".to_string(),
        SnapshotRegion::Loaded { pretty } => format!("<pre>{}</pre>", escape_html(pretty)),
        SnapshotRegion::Error { message } => alert("danger", message),
    };
    let notice = match &config.notice {
        Some(outcome) => format!(
            "<div id=\"config-message\">{}</div>",
            alert(outcome.kind.as_str(), &outcome.text)
        ),
        None => "<div id=\"config-message\" class=\"hidden\"></div>".to_string(),
    };
    let form = &config.form;

    format!(
        "<section>\n<h2>当前配置</h2>\n<div id=\"current-config\">{snapshot}</div>\n</section>\n<section>\n<h2>更新配置</h2>\n{notice}\n<form id=\"update-config-form\" method=\"post\" action=\"/config\">\n<div class=\"row\"><div>{}{}{}</div><div>{}{}{}</div></div>\n<div class=\"actions\"><button>更新配置</button></div>\n</form>\n</section>\n",
        input(
            "rocksdb-path",
            "rocksdb_path",
            "RocksDB 路径",
            &form.rocksdb_path,
            "留空不修改",
        ),
        input(
            "disk-store-path",
            "disk_store_path",
            "磁盘存储路径",
            &form.disk_store_path,
            "留空不修改",
        ),
        input(
            "large-value-size",
            "large_value_size",
            "大值阈值 (字节)",
            &form.large_value_size,
            "留空不修改",
        ),
        input(
            "max-disk-usage",
            "max_disk_usage",
            "最大磁盘使用率",
            &form.max_disk_usage,
            "0.0 - 1.0",
        ),
        input(
            "eviction-check-interval",
            "eviction_check_interval",
            "淘汰检查间隔 (秒)",
            &form.eviction_check_interval,
            "留空不修改",
        ),
        input(
            "eviction-batch-size",
            "eviction_batch_size",
            "淘汰批量大小",
            &form.eviction_batch_size,
            "留空不修改",
        ),
    )
}
