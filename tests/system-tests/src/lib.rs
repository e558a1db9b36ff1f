
#[cfg(test)]
mod tests {
    use anyhow::{Context, Result};
    use client_sdk::{CallError, KvApi, ServiceClient};
    use common::{KeysRequest, MsetRequest, SetRequest};
    use console_core::{
        AppHandle, ConfigForm, ConsoleConfig, GetRegion, HealthState, ListId, MgetRegion,
        NoticeKind, ScanRegion, SetForm, SnapshotRegion,
    };
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::fake_service::FakeKvService;

    async fn app_for(service: &FakeKvService) -> AppHandle {
        console_core::initialize(ConsoleConfig::new(service.base_url())).await
    }

    async fn fill(app: &AppHandle, list: ListId, rows: &[(&str, &str)]) {
        let batch = app.batch();
        let first = batch.view().await.list(list).rows()[0].id;
        for (index, (key, value)) in rows.iter().enumerate() {
            let row = if index == 0 {
                first
            } else {
                batch.add_row(list).await
            };
            batch.set_key(list, row, *key).await;
            batch.set_value(list, row, *value).await;
        }
    }

    #[tokio::test]
    async fn sdk_roundtrip_against_live_service() -> Result<()> {
        let mut service = FakeKvService::start().await?;
        let client = ServiceClient::new(service.base_url());

        let reply = client
            .set(&SetRequest {
                key: "sdk/key".to_string(),
                value: "hello".to_string(),
                ttl: Some(30),
            })
            .await?;
        assert!(reply.success);
        assert_eq!(service.ttl_of("sdk/key").await, Some(30));

        let fetched = client.get("sdk/key").await?;
        assert_eq!(fetched.value.as_deref(), Some("hello"));

        let missing = client.get("nope").await?;
        assert_eq!(missing.error.as_deref(), Some("key not found: nope"));

        let deleted = client.delete("sdk/key").await?;
        assert!(deleted.success);
        assert_eq!(service.stored("sdk/key").await, None);

        service.stop().await;
        Ok(())
    }

    #[tokio::test]
    async fn sdk_batch_and_scan_calls() -> Result<()> {
        let mut service = FakeKvService::start().await?;
        let client = ServiceClient::new(service.base_url());

        let reply = client
            .mset(&MsetRequest {
                kvs: [("user:1", "ann"), ("user:2", "bob"), ("order:1", "x")]
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                ttl: None,
            })
            .await?;
        assert!(reply.success);

        let scanned = client.scan("user:").await?;
        assert_eq!(scanned.count, Some(2));
        assert_eq!(
            scanned.pairs(),
            vec![
                ("user:1".to_string(), "ann".to_string()),
                ("user:2".to_string(), "bob".to_string()),
            ]
        );

        let fetched = client
            .mget(&KeysRequest {
                keys: vec!["order:1".to_string(), "ghost".to_string()],
            })
            .await?;
        assert_eq!(fetched.count, Some(1));

        let empty = client.mdelete(&KeysRequest::default()).await?;
        assert!(!empty.success);
        assert_eq!(empty.error.as_deref(), Some("keys cannot be empty"));

        service.stop().await;
        Ok(())
    }

    #[tokio::test]
    async fn set_without_ttl_notifies_and_clears_form() -> Result<()> {
        let mut service = FakeKvService::start().await?;
        let app = app_for(&service).await;

        let outcome = app
            .single()
            .set(SetForm {
                key: "a".to_string(),
                value: "b".to_string(),
                ttl: String::new(),
            })
            .await;

        assert_eq!(outcome.text, "设置成功: key set successfully");
        assert_eq!(service.stored("a").await.as_deref(), Some("b"));
        assert_eq!(service.ttl_of("a").await, None);

        let view = app.view().await;
        assert_eq!(view.single.set_form, SetForm::default());
        let shown = view.notification.context("missing notification")?;
        assert_eq!(shown.kind, NoticeKind::Success);

        service.stop().await;
        Ok(())
    }

    #[tokio::test]
    async fn get_missing_key_renders_service_error() -> Result<()> {
        let mut service = FakeKvService::start().await?;
        let app = app_for(&service).await;

        let region = app.single().get("nope").await;

        assert_eq!(
            region,
            GetRegion::Error {
                message: "key not found: nope".to_string(),
            }
        );

        service.stop().await;
        Ok(())
    }

    #[tokio::test]
    async fn mset_drops_incomplete_rows_and_resets_list() -> Result<()> {
        let mut service = FakeKvService::start().await?;
        let app = app_for(&service).await;
        fill(&app, ListId::Mset, &[("x", "1"), ("y", ""), ("z", "2")]).await;
        app.batch().set_mset_ttl("45").await;

        let outcome = app.batch().mset().await;

        assert_eq!(outcome.text, "批量设置成功: keys set successfully");
        assert_eq!(service.keys().await, vec!["x".to_string(), "z".to_string()]);
        assert_eq!(service.ttl_of("z").await, Some(45));

        let view = app.batch().view().await;
        assert_eq!(view.mset.len(), 1);
        assert!(view.mset.rows()[0].field.is_blank());
        assert_eq!(view.mset_ttl, "");

        service.stop().await;
        Ok(())
    }

    #[tokio::test]
    async fn empty_mset_reaches_service_and_keeps_list() -> Result<()> {
        let mut service = FakeKvService::start().await?;
        let app = app_for(&service).await;
        fill(&app, ListId::Mset, &[("only-key", "")]).await;

        let outcome = app.batch().mset().await;

        assert_eq!(outcome.kind, NoticeKind::Danger);
        assert_eq!(outcome.text, "批量设置失败: kvs cannot be empty");
        let rows = app.batch().collect(ListId::Mset).await;
        assert_eq!(rows[0].key(), "only-key");

        service.stop().await;
        Ok(())
    }

    #[tokio::test]
    async fn scan_renders_table_and_keys_from_same_response() -> Result<()> {
        let mut service = FakeKvService::start().await?;
        let app = app_for(&service).await;
        fill(&app, ListId::Mset, &[("k1", "v1"), ("k2", "v2")]).await;
        app.batch().mset().await;

        match app.scan().scan("").await {
            ScanRegion::Table { count, rows } => {
                assert_eq!(count, 2);
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0].key, "k1");
                assert_eq!(rows[1].value, "v2");
            }
            other => panic!("unexpected scan region {other:?}"),
        }

        assert_eq!(
            app.scan().scan_keys_only("").await,
            ScanRegion::Keys {
                keys: vec!["k1".to_string(), "k2".to_string()],
            }
        );

        service.stop().await;
        Ok(())
    }

    #[tokio::test]
    async fn mget_and_mdelete_over_key_lists() -> Result<()> {
        let mut service = FakeKvService::start().await?;
        let app = app_for(&service).await;
        fill(&app, ListId::Mset, &[("a", "1"), ("b", "2"), ("c", "3")]).await;
        app.batch().mset().await;

        fill(&app, ListId::Mget, &[("c", ""), ("", ""), ("a", "")]).await;
        match app.batch().mget().await {
            MgetRegion::Entries { count, entries } => {
                assert_eq!(count, 2);
                let keys = entries.iter().map(|e| e.key.as_str()).collect::<Vec<_>>();
                assert_eq!(keys, vec!["c", "a"]);
            }
            other => panic!("unexpected mget region {other:?}"),
        }

        fill(&app, ListId::Mdelete, &[("a", ""), ("b", "")]).await;
        let outcome = app.batch().mdelete().await;
        assert_eq!(outcome.text, "批量删除成功: keys deleted successfully");
        assert_eq!(service.keys().await, vec!["c".to_string()]);
        assert_eq!(app.batch().view().await.mdelete.len(), 1);

        service.stop().await;
        Ok(())
    }

    #[tokio::test]
    async fn config_update_sends_only_filled_fields_and_refetches() -> Result<()> {
        let mut service = FakeKvService::start().await?;
        let app = app_for(&service).await;
        assert!(matches!(
            app.settings().view().await.snapshot,
            SnapshotRegion::Loaded { .. }
        ));

        let outcome = app
            .settings()
            .update(ConfigForm {
                large_value_size: "2048".to_string(),
                disk_store_path: "/mnt/values".to_string(),
                ..ConfigForm::default()
            })
            .await;

        assert_eq!(outcome.text, "配置更新成功: config updated successfully");
        assert_eq!(
            service.config_updates().await,
            vec![json!({ "disk_store_path": "/mnt/values", "large_value_size": 2048 })]
        );

        let view = app.settings().view().await;
        assert_eq!(view.form, ConfigForm::default());
        let SnapshotRegion::Loaded { pretty } = view.snapshot else {
            panic!("snapshot not loaded");
        };
        let snapshot: Value = serde_json::from_str(&pretty)?;
        assert_eq!(snapshot["value"]["disk_threshold"], json!(2048));
        assert_eq!(snapshot["value"]["disk_path"], json!("/mnt/values"));

        service.stop().await;
        Ok(())
    }

    #[tokio::test]
    async fn malformed_config_number_is_rejected_by_service() -> Result<()> {
        let mut service = FakeKvService::start().await?;
        let app = app_for(&service).await;
        let before = app.settings().view().await.snapshot;

        let outcome = app
            .settings()
            .update(ConfigForm {
                eviction_batch_size: "lots".to_string(),
                ..ConfigForm::default()
            })
            .await;

        assert_eq!(outcome.kind, NoticeKind::Danger);
        assert_eq!(
            outcome.text,
            "配置更新失败: invalid request: eviction_batch_size must be a number"
        );
        let view = app.settings().view().await;
        assert_eq!(view.snapshot, before);
        assert_eq!(view.form.eviction_batch_size, "lots");
        assert!(service.config_updates().await.is_empty());

        service.stop().await;
        Ok(())
    }

    #[tokio::test]
    async fn health_moves_from_unhealthy_to_unreachable() -> Result<()> {
        let mut service = FakeKvService::start().await?;
        service.set_health("down", "disk full").await;
        let app = app_for(&service).await;

        let first = app
            .health()
            .current()
            .await
            .context("startup health check did not settle")?;
        assert_eq!(
            first,
            HealthState::Unhealthy {
                message: "disk full".to_string(),
            }
        );

        service.stop().await;
        let second = app.health().check().await;

        assert_eq!(second.label(), "错误");
        assert!(matches!(second, HealthState::Unreachable { .. }));
        assert!(second.detail().starts_with("无法连接到服务: "));
        Ok(())
    }

    #[tokio::test]
    async fn non_json_reply_is_a_transport_failure() -> Result<()> {
        let mut service = FakeKvService::start().await?;
        let client = ServiceClient::new(format!("{}/not-the-api", service.base_url()));

        let err = client.health().await.unwrap_err();
        assert!(matches!(err, CallError::InvalidBody(_)));

        service.stop().await;
        Ok(())
    }

    #[tokio::test]
    async fn web_console_drives_batch_list_through_forms() -> Result<()> {
        let mut service = FakeKvService::start().await?;
        let app = app_for(&service).await;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let console_url = format!("http://{}", listener.local_addr()?);
        let router = web_ui::router(app.clone());
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        let http = reqwest::Client::new();

        let ping = http
            .get(format!("{console_url}/api/ping"))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        assert!(ping.contains("\"ok\":true"));

        let first = app.batch().view().await.mset.rows()[0].id;
        http.post(format!("{console_url}/batch/mset"))
            .form(&[
                (format!("key-{first}"), "x".to_string()),
                (format!("value-{first}"), "1".to_string()),
                ("action".to_string(), "add".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let rows = app.batch().view().await.mset.rows().to_vec();
        assert_eq!(rows.len(), 2);
        let second = rows[1].id;

        let page = http
            .post(format!("{console_url}/batch/mset"))
            .form(&[
                (format!("key-{first}"), "x".to_string()),
                (format!("value-{first}"), "1".to_string()),
                (format!("key-{second}"), "y".to_string()),
                (format!("value-{second}"), "2".to_string()),
                ("action".to_string(), "submit".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        assert!(page.contains("批量设置成功: keys set successfully"));
        assert_eq!(service.stored("y").await.as_deref(), Some("2"));
        assert_eq!(app.batch().view().await.mset.len(), 1);

        let view: Value = http
            .get(format!("{console_url}/api/view"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        assert_eq!(view["notification"]["kind"], json!("success"));

        server.abort();
        service.stop().await;
        Ok(())
    }

    #[tokio::test]
    async fn web_console_switches_tabs_and_scans() -> Result<()> {
        let mut service = FakeKvService::start().await?;
        let app = app_for(&service).await;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let console_url = format!("http://{}", listener.local_addr()?);
        let router = web_ui::router(app.clone());
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        let http = reqwest::Client::new();

        http.post(format!("{console_url}/single/set"))
            .form(&[("key", "user:1"), ("value", "<ann>"), ("ttl", "")])
            .send()
            .await?
            .error_for_status()?;

        http.post(format!("{console_url}/tabs/scan"))
            .send()
            .await?
            .error_for_status()?;

        let page = http
            .post(format!("{console_url}/scan"))
            .form(&[("prefix", "user:"), ("mode", "keys_only")])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        assert!(page.contains("<li>user:1</li>"));
        assert!(page.contains("id=\"scan\" class=\"tab-content \""));
        assert!(page.contains("id=\"single\" class=\"tab-content hidden\""));

        let page = http
            .post(format!("{console_url}/scan"))
            .form(&[("prefix", "user:"), ("mode", "table")])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        assert!(page.contains("<pre>&lt;ann&gt;</pre>"));

        server.abort();
        service.stop().await;
        Ok(())
    }
}
