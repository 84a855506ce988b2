//! Integration tests for full sync runs
//!
//! These tests mock the portal with wiremock and run the whole pipeline
//! against a real SQLite provider table.

use redconar_sync::config::{Config, Credentials, PortalConfig};
use redconar_sync::storage::{NewProvider, ProviderStore, RunStatus, SqliteStore};
use redconar_sync::{run_sync, FetchError, SessionToken, SyncError, SyncOptions};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOGIN_PATH: &str = "/userValidator.php";
const LISTING_PATH: &str = "/ajax/proveedores/ajaxScriptProviders.php";

const LISTING: &str = "<option value=''>Seleccione un proveedor...</option>\
    <option value='6409'>Sanitarios Lopez - Lopez Hnos SRL |  30-71568977-0</option>\
    <option value='100'>Pinturas Sur |  20-11111111-1</option>\
    <option value='777'>Electricidad Oeste - Oeste SA |  33-33333333-3</option>\
    <option value='6410'>Vidrieria Norte |  --</option>";

const LOGIN_PAGE: &str = "<!DOCTYPE html><html><body>Ingresar</body></html>";

fn test_config(server: &MockServer) -> Config {
    Config {
        portal: PortalConfig::with_base_url(server.uri()),
        ..Config::default()
    }
}

fn credentials() -> Credentials {
    Credentials::new("admin", "secret")
}

/// Seeds a provider table covering every reconciliation bucket
///
/// Returns the ids of the provider to link and the one missing upstream.
fn seed(store: &mut SqliteStore) -> (String, String) {
    let to_link = store
        .insert_provider(&NewProvider {
            tax_id: Some("30715689770".to_string()),
            display_name: "Sanitarios Lopez".to_string(),
            ..NewProvider::default()
        })
        .expect("Failed to insert provider");

    store
        .insert_provider(&NewProvider {
            tax_id: Some("20-11111111-1".to_string()),
            display_name: "Pinturas Sur".to_string(),
            external_id: Some("100".to_string()),
            ..NewProvider::default()
        })
        .expect("Failed to insert provider");

    let missing = store
        .insert_provider(&NewProvider {
            tax_id: Some("27-22222222-2".to_string()),
            display_name: "Herreria Centro".to_string(),
            ..NewProvider::default()
        })
        .expect("Failed to insert provider");

    store
        .insert_provider(&NewProvider {
            display_name: "Sin CUIT".to_string(),
            ..NewProvider::default()
        })
        .expect("Failed to insert provider");

    (to_link, missing)
}

async fn mount_login(server: &MockServer, session_id: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("set-cookie", format!("PHPSESSID={}; path=/", session_id).as_str())
                .insert_header("location", "/login/ingresar.php"),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_listing(server: &MockServer, session_id: &str, body: &str) {
    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .and(header("cookie", format!("PHPSESSID={}", session_id).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_sync_links_matching_providers() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, "fresh", 1).await;
    mount_listing(&mock_server, "fresh", LISTING).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("proveedores.db");
    let mut store = SqliteStore::new(&db_path).expect("Failed to open DB");
    let (to_link, missing) = seed(&mut store);

    let outcome = run_sync(
        &test_config(&mock_server),
        &credentials(),
        &mut store,
        SyncOptions::default(),
    )
    .await
    .expect("Sync failed");

    let report = outcome.report();
    assert_eq!(report.linked, 1);
    assert_eq!(report.link_errors, 0);
    assert_eq!(report.new_in_remote, 1);
    assert_eq!(report.missing_in_remote, 1);
    assert_eq!(report.total_local, 4);
    assert_eq!(report.total_remote, 4);
    assert_eq!(report.session_id, "fresh");

    assert_eq!(outcome.result.new_in_remote[0].external_id, "777");
    assert_eq!(outcome.result.missing_in_remote[0].id, missing);

    drop(store);

    // Reopen to check the link was committed
    let store = SqliteStore::new(&db_path).expect("Failed to reopen DB");
    let linked = store
        .get_provider(&to_link)
        .expect("Failed to read provider")
        .expect("Provider should exist");
    assert_eq!(linked.external_id.as_deref(), Some("6409"));

    let unlinked = store
        .get_provider(&missing)
        .expect("Failed to read provider")
        .expect("Provider should exist");
    assert_eq!(unlinked.external_id, None);

    let run = store
        .latest_run()
        .expect("Failed to read run history")
        .expect("Run should be recorded");
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.counts.map(|c| c.linked), Some(1));
}

#[tokio::test]
async fn test_second_sync_has_nothing_to_link() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, "fresh", 2).await;
    mount_listing(&mock_server, "fresh", LISTING).await;

    let mut store = SqliteStore::new_in_memory().expect("Failed to create DB");
    seed(&mut store);
    let config = test_config(&mock_server);

    let first = run_sync(&config, &credentials(), &mut store, SyncOptions::default())
        .await
        .expect("First sync failed");
    let second = run_sync(&config, &credentials(), &mut store, SyncOptions::default())
        .await
        .expect("Second sync failed");

    assert_eq!(first.linked, 1);
    assert_eq!(second.linked, 0);
    assert!(second.result.to_link.is_empty());
    assert_eq!(second.run_id, first.run_id + 1);
}

#[tokio::test]
async fn test_dry_run_does_not_link() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, "fresh", 1).await;
    mount_listing(&mock_server, "fresh", LISTING).await;

    let mut store = SqliteStore::new_in_memory().expect("Failed to create DB");
    let (to_link, _) = seed(&mut store);

    let options = SyncOptions {
        dry_run: true,
        ..SyncOptions::default()
    };
    let outcome = run_sync(&test_config(&mock_server), &credentials(), &mut store, options)
        .await
        .expect("Sync failed");

    assert_eq!(outcome.linked, 0);
    assert_eq!(outcome.result.to_link.len(), 1);

    let provider = store
        .get_provider(&to_link)
        .expect("Failed to read provider")
        .expect("Provider should exist");
    assert_eq!(provider.external_id, None);
}

#[tokio::test]
async fn test_reused_session_skips_login() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, "unused", 0).await;
    mount_listing(&mock_server, "kept", LISTING).await;

    let mut store = SqliteStore::new_in_memory().expect("Failed to create DB");
    seed(&mut store);

    let options = SyncOptions {
        session: Some(SessionToken::new("kept")),
        ..SyncOptions::default()
    };
    let outcome = run_sync(&test_config(&mock_server), &credentials(), &mut store, options)
        .await
        .expect("Sync failed");

    assert_eq!(outcome.session.as_str(), "kept");
    assert_eq!(outcome.linked, 1);
}

#[tokio::test]
async fn test_stale_session_is_replaced_once() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, "fresh", 1).await;
    mount_listing(&mock_server, "stale", LOGIN_PAGE).await;
    mount_listing(&mock_server, "fresh", LISTING).await;

    let mut store = SqliteStore::new_in_memory().expect("Failed to create DB");
    seed(&mut store);

    let options = SyncOptions {
        session: Some(SessionToken::new("stale")),
        ..SyncOptions::default()
    };
    let outcome = run_sync(&test_config(&mock_server), &credentials(), &mut store, options)
        .await
        .expect("Sync failed");

    assert_eq!(outcome.session.as_str(), "fresh");
    assert_eq!(outcome.report().session_id, "fresh");
    assert_eq!(outcome.linked, 1);
}

#[tokio::test]
async fn test_fresh_session_rejected_is_not_retried() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, "fresh", 1).await;
    mount_listing(&mock_server, "fresh", LOGIN_PAGE).await;

    let mut store = SqliteStore::new_in_memory().expect("Failed to create DB");
    seed(&mut store);

    let err = run_sync(
        &test_config(&mock_server),
        &credentials(),
        &mut store,
        SyncOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SyncError::Fetch(FetchError::SessionExpired)));
}

#[tokio::test]
async fn test_fetch_failure_records_failed_run() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, "fresh", 1).await;

    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut store = SqliteStore::new_in_memory().expect("Failed to create DB");
    let (to_link, _) = seed(&mut store);

    let options = SyncOptions {
        config_hash: "abc".to_string(),
        ..SyncOptions::default()
    };
    let err = run_sync(&test_config(&mock_server), &credentials(), &mut store, options)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Fetch(FetchError::UnexpectedStatus(500))));

    let run = store
        .latest_run()
        .expect("Failed to read run history")
        .expect("Run should be recorded");
    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.config_hash, "abc");
    assert!(run.error_message.is_some());
    assert!(run.finished_at.is_some());

    // Nothing is linked when the listing cannot be read
    let provider = store
        .get_provider(&to_link)
        .expect("Failed to read provider")
        .expect("Provider should exist");
    assert_eq!(provider.external_id, None);
}

#[tokio::test]
async fn test_login_failure_fails_run() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/login/error.php"))
        .mount(&mock_server)
        .await;

    let mut store = SqliteStore::new_in_memory().expect("Failed to create DB");

    let err = run_sync(
        &test_config(&mock_server),
        &credentials(),
        &mut store,
        SyncOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SyncError::Acquisition(_)));
}
