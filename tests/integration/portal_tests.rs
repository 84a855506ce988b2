//! Integration tests for the portal client
//!
//! A wiremock server stands in for the Redconar login and listing endpoints.

use redconar_sync::config::{Credentials, HttpConfig, PortalConfig};
use redconar_sync::portal::{build_http_client, ProviderFetcher, SessionAcquirer, SessionToken};
use redconar_sync::{AcquisitionError, FetchError};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOGIN_PATH: &str = "/userValidator.php";
const LISTING_PATH: &str = "/ajax/proveedores/ajaxScriptProviders.php";

fn acquirer_for(server: &MockServer) -> SessionAcquirer {
    let client = build_http_client(&HttpConfig::default()).expect("Failed to build client");
    let portal = PortalConfig::with_base_url(server.uri());
    SessionAcquirer::new(client, &portal, Credentials::new("admin", "secret"))
}

fn fetcher_for(server: &MockServer) -> ProviderFetcher {
    let client = build_http_client(&HttpConfig::default()).expect("Failed to build client");
    let portal = PortalConfig::with_base_url(server.uri());
    ProviderFetcher::new(client, &portal, "admin")
}

#[tokio::test]
async fn test_acquire_session_from_redirect() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .and(body_string_contains("usuario=admin"))
        .and(body_string_contains("contrasena=secret"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("set-cookie", "PHPSESSID=abc123; path=/")
                .insert_header("location", "/login/ingresar.php"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let token = acquirer_for(&mock_server)
        .acquire()
        .await
        .expect("Login should succeed");

    assert_eq!(token.as_str(), "abc123");
}

#[tokio::test]
async fn test_acquire_session_without_redirect() {
    let mock_server = MockServer::start().await;

    // A cookie on a plain 200 is still a session
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "PHPSESSID=xyz; path=/"))
        .mount(&mock_server)
        .await;

    let token = acquirer_for(&mock_server).acquire().await.expect("Login should succeed");
    assert_eq!(token.as_str(), "xyz");
}

#[tokio::test]
async fn test_redirect_without_cookie() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/login/error.php"))
        .mount(&mock_server)
        .await;

    let err = acquirer_for(&mock_server).acquire().await.unwrap_err();

    match err {
        AcquisitionError::NoRedirectCookie { status, location } => {
            assert_eq!(status, 302);
            assert_eq!(location, "/login/error.php");
        }
        other => panic!("Expected NoRedirectCookie, got {:?}", other),
    }
}

#[tokio::test]
async fn test_ok_without_cookie() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&mock_server)
        .await;

    let err = acquirer_for(&mock_server).acquire().await.unwrap_err();

    assert!(matches!(err, AcquisitionError::NoCookieAtAll { status: 200 }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_unreachable_portal() {
    // Reserve a port, then close it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read address");
    drop(listener);

    let client = build_http_client(&HttpConfig::default()).expect("Failed to build client");
    let portal = PortalConfig::with_base_url(format!("http://{}", addr));
    let acquirer = SessionAcquirer::new(client, &portal, Credentials::new("admin", "secret"));

    let err = acquirer.acquire().await.unwrap_err();

    assert!(matches!(err, AcquisitionError::Transport(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_fetch_listing_with_session_cookie() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .and(header("cookie", "PHPSESSID=abc"))
        .and(body_string_contains("selbId=16528"))
        .and(body_string_contains("user=admin"))
        .and(body_string_contains("valuecuit=0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<option value=''>Seleccione un proveedor...</option>\
             <option value='6409'>Sanitarios Lopez - Lopez Hnos SRL |  30-71568977-0</option>\
             <option value='6410'>Vidrieria Norte |  --</option>",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let providers = fetcher_for(&mock_server)
        .fetch(&SessionToken::new("abc"), "16528")
        .await
        .expect("Fetch should succeed");

    assert_eq!(providers.len(), 2);
    assert_eq!(providers[0].external_id, "6409");
    assert_eq!(providers[0].display_name, "Sanitarios Lopez");
    assert_eq!(providers[0].legal_name, "Lopez Hnos SRL");
    assert_eq!(providers[0].tax_id.as_deref(), Some("30-71568977-0"));
    assert_eq!(providers[1].tax_id, None);
}

#[tokio::test]
async fn test_fetch_empty_listing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&mock_server)
        .await;

    let providers = fetcher_for(&mock_server)
        .fetch(&SessionToken::new("abc"), "16528")
        .await
        .expect("Fetch should succeed");

    assert!(providers.is_empty());
}

#[tokio::test]
async fn test_fetch_unexpected_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let err = fetcher_for(&mock_server)
        .fetch(&SessionToken::new("abc"), "16528")
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::UnexpectedStatus(500)));
}

#[tokio::test]
async fn test_fetch_login_page_means_expired() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<!DOCTYPE html><html><body><form action='/userValidator.php'></form></body></html>",
        ))
        .mount(&mock_server)
        .await;

    let err = fetcher_for(&mock_server)
        .fetch(&SessionToken::new("stale"), "16528")
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::SessionExpired));
}
