#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use ggus_watch::config::Credentials;
use ggus_watch::error::{Error, GgusError};
use ggus_watch::ggus::{GgusClient, TicketQuery};
use ggus_watch::types::{QueryStatus, TicketStatus};
use secrecy::SecretString;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OPEN_EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tickets>
  <ticket>
    <Ticket-ID>164021</Ticket-ID>
    <Status>assigned</Status>
    <Site>NIKHEF-ELPROD</Site>
    <Date_Of_Creation>2024-03-01 09:12</Date_Of_Creation>
    <Last_Update>2024-03-02 10:00</Last_Update>
    <Subject>SRM transfers failing</Subject>
    <Type>Incident</Type>
    <Scope>WLCG</Scope>
    <VO>atlas</VO>
  </ticket>
  <ticket>
    <Ticket-ID>164022</Ticket-ID>
    <Status>in progress</Status>
    <Site></Site>
    <Subject>Accounting gap</Subject>
  </ticket>
</tickets>
"#;

fn client(server: &MockServer) -> GgusClient {
    GgusClient::new(
        Url::parse(&server.uri()).expect("valid mock url"),
        Duration::from_secs(2),
        Duration::from_secs(1),
        true,
    )
    .expect("client")
}

fn credentials() -> Credentials {
    Credentials {
        username: "operator".to_string(),
        password: SecretString::from("hunter2"),
    }
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/index.php"))
        .and(query_param("mode", "login"))
        .and(body_string_contains("login=operator"))
        .and(body_string_contains("password=hunter2"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "PHPSESSID=abc123; Path=/"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_then_fetch_open_tickets() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("mode", "ticket_search"))
        .and(query_param("supportunit", "NGI_NL"))
        .and(query_param("status", "open"))
        .and(query_param("timeframe", "any"))
        .and(query_param("writeFormat", "XML"))
        .respond_with(ResponseTemplate::new(200).set_body_string(OPEN_EXPORT))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client.login(&credentials()).await.expect("login");
    let tickets = client
        .fetch(&TicketQuery::new("NGI_NL", QueryStatus::Open))
        .await
        .expect("tickets");

    assert_eq!(tickets.len(), 2);
    assert_eq!(tickets[0].id, "164021");
    assert!(tickets[0].status_is(&TicketStatus::Assigned));
    assert_eq!(tickets[0].site(), Some("NIKHEF-ELPROD"));
    assert_eq!(tickets[1].id, "164022");
    assert_eq!(tickets[1].site(), None);
}

#[tokio::test]
async fn terminal_search_is_limited_to_last_month() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("status", "terminal"))
        .and(query_param("timeframe", "lastmonth"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<tickets/>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client.login(&credentials()).await.expect("login");
    let tickets = client
        .fetch(&TicketQuery::new("NGI_NL", QueryStatus::Terminal))
        .await
        .expect("tickets");
    assert!(tickets.is_empty());
}

#[tokio::test]
async fn login_without_session_cookie_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/index.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Login failed</html>"))
        .mount(&server)
        .await;

    let err = client(&server).login(&credentials()).await.unwrap_err();
    assert!(matches!(err, Error::Ggus(GgusError::Auth { .. })));
    assert_eq!(err.kind(), "auth");
}

#[tokio::test]
async fn fetch_before_login_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(OPEN_EXPORT))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch(&TicketQuery::new("NGI_NL", QueryStatus::Open))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Ggus(GgusError::Auth { .. })));
}

#[tokio::test]
async fn malformed_export_is_parse_error() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<tickets><ticket>"))
        .mount(&server)
        .await;

    let client = client(&server);
    client.login(&credentials()).await.expect("login");
    let err = client
        .fetch(&TicketQuery::new("NGI_NL", QueryStatus::Open))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Ggus(GgusError::Parse { .. })));
}

#[tokio::test]
async fn server_error_is_reported_with_status() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client(&server);
    client.login(&credentials()).await.expect("login");
    let err = client
        .fetch(&TicketQuery::new("NGI_NL", QueryStatus::Open))
        .await
        .unwrap_err();
    match err {
        Error::Ggus(GgusError::HttpStatus { status }) => assert_eq!(status.as_u16(), 500),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn plain_http_is_refused_without_insecure() {
    let result = GgusClient::new(
        Url::parse("http://ggus.example.org/").unwrap(),
        Duration::from_secs(2),
        Duration::from_secs(1),
        false,
    );
    assert!(matches!(result, Err(Error::Config(_))));
}
