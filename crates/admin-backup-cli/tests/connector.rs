//! HTTP connector and command tests against a mock panel.

use std::collections::HashMap;

use admin_backup::archive::{build, ArchiveEntry};
use admin_backup::{BackupError, ModuleParams, ModuleTransport};
use admin_backup_cli::commands;
use admin_backup_cli::config::BackupConfig;
use admin_backup_cli::WikidotConnector;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONNECTOR: &str = "/ajax-module-connector.php";

fn connector(server: &MockServer) -> WikidotConnector {
    WikidotConnector::new(Url::parse(&server.uri()).unwrap(), "sess-42", 2_000).unwrap()
}

#[tokio::test]
async fn test_module_call_posts_form_with_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CONNECTOR))
        .and(body_string_contains("moduleName=managesite%2FManageSiteGeneralModule"))
        .and(header_regex("cookie", "WIKIDOT_SESSION_ID=sess-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "body": "<p>hi</p>"})))
        .expect(1)
        .mount(&server)
        .await;

    let envelope = connector(&server)
        .module_call("managesite/ManageSiteGeneralModule", &ModuleParams::new().with("page", "3"))
        .await
        .unwrap();
    assert_eq!(envelope["status"], "ok");

    let requests = server.received_requests().await.unwrap();
    let form: HashMap<String, String> = url::form_urlencoded::parse(&requests[0].body)
        .into_owned()
        .collect();
    assert_eq!(form["page"], "3");
    assert_eq!(form["callbackIndex"], "0");
    let cookie = requests[0].headers.get("cookie").unwrap().to_str().unwrap();
    assert!(cookie.contains(&format!("wikidot_token7={}", form["wikidot_token7"])));
}

#[tokio::test]
async fn test_http_error_is_a_transport_fault() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CONNECTOR))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = connector(&server)
        .module_call("managesite/ManageSiteGeneralModule", &ModuleParams::new())
        .await
        .unwrap_err();
    assert!(matches!(err, BackupError::Transport(msg) if msg.contains("503")));
    // Single attempt, no retry.
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_non_json_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CONNECTOR))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = connector(&server)
        .module_call("managesite/ManageSiteGeneralModule", &ModuleParams::new())
        .await
        .unwrap_err();
    assert!(matches!(err, BackupError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_fetch_asset_resolves_relative_src() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/local--favicon/favicon.gif"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"GIF89a".to_vec()))
        .mount(&server)
        .await;

    let bytes = connector(&server)
        .fetch_asset("/local--favicon/favicon.gif")
        .await
        .unwrap();
    assert_eq!(bytes, b"GIF89a");
}

#[tokio::test]
async fn test_failed_backup_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CONNECTOR))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "not_ok", "message": "Permission denied."})),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = BackupConfig::resolve(
        "scp-wiki",
        Some("sess-42"),
        dir.path().to_str(),
        Some(&server.uri()),
        Some(2_000),
    )
    .unwrap();

    let err = commands::backup(&config).await.unwrap_err();
    assert!(format!("{err:#}").contains("Permission denied."));
    assert!(!dir.path().join("scp-wiki.zip").exists());
}

#[test]
fn test_inspect_lists_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scp-wiki.zip");
    let bytes = build(&[
        ArchiveEntry::structured("site.json", &json!({"general": {}})).unwrap(),
        ArchiveEntry::binary("favicon.gif", b"GIF89a".to_vec()),
    ])
    .unwrap();
    std::fs::write(&path, bytes).unwrap();

    let entries = commands::inspect(&path).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].0, "site.json");
    assert_eq!(entries[1], ("favicon.gif".to_string(), 6));
}
