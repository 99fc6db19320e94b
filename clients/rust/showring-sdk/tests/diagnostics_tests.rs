//! Connectivity diagnostics against a mock platform server

use showring_sdk::{ClientConfig, NetworkDiagnostics};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn diagnostics(base_url: impl Into<String>) -> NetworkDiagnostics {
    NetworkDiagnostics::new(ClientConfig::with_base_url(base_url)).unwrap()
}

#[tokio::test]
async fn test_connection_follows_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let diagnostics = diagnostics(server.uri());
    assert!(diagnostics.test_connection().await);
    assert!(!diagnostics.test_connection().await);
}

#[tokio::test]
async fn test_report_covers_backend_and_tcp() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let report = diagnostics(server.uri()).run_diagnostics().await;
    let port = server.address().port();
    assert!(report.contains(&format!("Base URL: {}", server.uri())), "{}", report);
    assert!(report.contains("Backend connectivity: OK"), "{}", report);
    assert!(report.contains(&format!("TCP 127.0.0.1:{}: OK", port)), "{}", report);
}

#[tokio::test]
async fn test_report_for_unusable_base_url() {
    let diagnostics = diagnostics("not a url");
    assert!(!diagnostics.test_connection().await);

    let report = diagnostics.run_diagnostics().await;
    assert!(report.contains("Backend connectivity: Failed"), "{}", report);
    assert!(report.contains("Invalid base URL"), "{}", report);
    assert!(diagnostics.test_login_endpoint().await.starts_with("Invalid login URL"));
}

#[tokio::test]
async fn test_login_endpoint_reports_each_method() {
    let server = MockServer::start().await;
    Mock::given(method("OPTIONS"))
        .and(path("/identity/login"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/identity/login"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;

    let report = diagnostics(server.uri()).test_login_endpoint().await;
    let url = format!("{}/identity/login", server.uri());
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 2, "{}", report);
    assert_eq!(lines[0], format!("OPTIONS {}: 204 No Content", url));
    assert_eq!(lines[1], format!("GET {}: 405 Method Not Allowed", url));
}
