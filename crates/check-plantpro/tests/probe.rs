//! End-to-end probe runs against a mock PlantPro web UI.

use std::time::{Duration, Instant};

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use check_plantpro::{Credentials, HttpTransport, Probe, ProbeConfig};
use plantpro::{ServiceState, ThresholdPolicy};

// ─────────────────────── helpers ───────────────────────

fn table_page(payload: &str) -> String {
    format!(
        "<html><body><form method=\"post\" action=\"003.t\">\
         <table><tr><td id=\"datat\">{payload}</td></tr></table>\
         </form></body></html>"
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/html")
}

fn config_for(server: &MockServer) -> ProbeConfig {
    let mut config = ProbeConfig::new("127.0.0.1");
    config.port = server.address().port();
    config.timeout = Duration::from_secs(2);
    config.retry.attempts = 1;
    config.retry.backoff = Duration::from_millis(10);
    config
}

fn probe(config: ProbeConfig) -> Probe<HttpTransport> {
    let transport = HttpTransport::new(&config).unwrap();
    Probe::new(transport, config)
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/001.t"))
        .respond_with(html("<html>menu</html>".to_string()))
        .mount(server)
        .await;
}

/// First page answers the open button, every later request gets `next`.
async fn mount_sensors(server: &MockServer, first: &str, next: &str) {
    Mock::given(method("POST"))
        .and(path("/003.t"))
        .and(body_string_contains("idbutton=13"))
        .respond_with(html(table_page(first)))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/003.t"))
        .and(body_string_contains("idbutton=4"))
        .respond_with(html(table_page(next)))
        .expect(2)
        .mount(server)
        .await;
}

async fn mount_alarms(server: &MockServer, payload: &str) {
    Mock::given(method("POST"))
        .and(path("/036.t"))
        .and(body_string_contains("idmenu=3"))
        .and(body_string_contains("go=037.t"))
        .and(body_string_contains("idbutton=9"))
        .respond_with(html(table_page(payload)))
        .expect(1)
        .mount(server)
        .await;
}

// ═══════════════════════════════════════════════════════
// SUCCESSFUL RUNS
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_filtered_sensor_ok() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_sensors(
        &server,
        "0|I/O-Modul 1|Kuehlung|3.0 C^1||Heizung|45.5 C",
        "2|I/O-Modul 2|Druck|1.2 bar",
    )
    .await;
    mount_alarms(&server, "").await;

    let mut config = config_for(&server);
    config.policy = ThresholdPolicy::new(None, None, "I/O-Modul 1.Kuehlung");
    let report = probe(config).check().await;

    assert_eq!(report.state, ServiceState::Ok);
    assert_eq!(report.line(), "3.0 C | 'I/O-Modul 1.Kuehlung'=3.0C;;;;");
}

#[tokio::test]
async fn test_thresholds_over_all_pages() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_sensors(&server, "0|M|A|5 C", "0|N|B|15 C").await;
    mount_alarms(&server, "").await;

    let mut config = config_for(&server);
    config.policy = ThresholdPolicy::new(Some(4.0), Some(10.0), "");
    let report = probe(config).check().await;

    assert_eq!(report.state, ServiceState::Critical);
    assert!(report.message.contains("Critical: N.B is 15.0 C"));
    assert_eq!(report.perf_data, "'M.A'=5.0C;4.0;10.0;; 'N.B'=15.0C;4.0;10.0;;");
    assert_eq!(report.exit_code(), 2);
}

#[tokio::test]
async fn test_active_alarms_are_critical() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_sensors(&server, "0|M|A|1 C", "0|M|B|2 C").await;
    mount_alarms(&server, "12.03. 08:15|Pumpe 1|Motorschutz").await;

    let report = probe(config_for(&server)).check().await;

    assert_eq!(report.state, ServiceState::Critical);
    assert_eq!(
        report.message,
        "Got '1' alarms\\n12.03. 08:15 - Pumpe 1 - Motorschutz"
    );
    assert_eq!(report.perf_data, "'M.A'=1.0C;;;; 'M.B'=2.0C;;;;");
}

#[tokio::test]
async fn test_login_sends_positional_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/001.t"))
        .and(body_string_contains("go=003.t"))
        .and(body_string_contains("idbutton=13"))
        .and(body_string_contains("4=plc-monitor"))
        .and(body_string_contains("5=s3cret"))
        .respond_with(html("<html>menu</html>".to_string()))
        .expect(1)
        .mount(&server)
        .await;
    mount_sensors(&server, "0|M|A|1 C", "0|M|B|2 C").await;
    mount_alarms(&server, "").await;

    let mut config = config_for(&server);
    config.credentials = Credentials {
        user: "plc-monitor".to_string(),
        password: "s3cret".to_string(),
    };
    let report = probe(config).check().await;
    assert_eq!(report.state, ServiceState::Ok);
    assert_eq!(report.message, "All sensors are OK");
}

#[tokio::test]
async fn test_latin1_pages() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let page = b"<html><body><div id=\"datat\">0|K\xfchlraum|Temp|4.5 \xb0C</div></body></html>".to_vec();

    Mock::given(method("POST"))
        .and(path("/003.t"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page, "text/html"))
        .mount(&server)
        .await;
    mount_alarms(&server, "").await;

    let mut config = config_for(&server);
    config.encoding = "iso-8859-1".to_string();
    let snapshot = probe(config).collect().await.unwrap();

    let reading = snapshot.sensors.get("Kühlraum.Temp").unwrap();
    assert_eq!(reading.value, 4.5);
    assert_eq!(reading.unit, "°C");
}

// ═══════════════════════════════════════════════════════
// FAILURES
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_unknown_after_exact_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/001.t"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.retry.attempts = 2;
    config.retry.backoff = Duration::from_millis(200);

    let started = Instant::now();
    let report = probe(config).check().await;

    assert_eq!(report.state, ServiceState::Unknown);
    assert_eq!(report.exit_code(), 3);
    assert!(report.message.contains("after 2 attempt(s)"));
    assert!(report.message.contains("status 500"));
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn test_missing_table_is_unknown() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/003.t"))
        .respond_with(html("<html><body>Session expired</body></html>".to_string()))
        .expect(1)
        .mount(&server)
        .await;

    let report = probe(config_for(&server)).check().await;
    assert_eq!(report.state, ServiceState::Unknown);
    assert!(report.message.contains("datat"));
}

#[tokio::test]
async fn test_filter_not_found() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_sensors(&server, "0|M|A|1 C", "0|M|B|2 C").await;
    mount_alarms(&server, "").await;

    let mut config = config_for(&server);
    config.policy = ThresholdPolicy::new(Some(1.0), None, "nope");
    let report = probe(config).check().await;

    assert_eq!(report.state, ServiceState::Unknown);
    assert_eq!(report.line(), "Sensor 'nope' not found | ");
}

#[tokio::test]
async fn test_alarm_page_without_table_is_unknown() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/003.t"))
        .respond_with(html(table_page("0|M|A|1 C")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/036.t"))
        .respond_with(html("<html><body>Login required</body></html>".to_string()))
        .expect(2)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.retry.attempts = 2;
    let report = probe(config).check().await;

    assert_eq!(report.state, ServiceState::Unknown);
    assert!(report.message.contains("datat"));
    assert_eq!(report.perf_data, "");
}

#[tokio::test]
async fn test_malformed_record_output_has_one_separator() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/003.t"))
        .respond_with(html(table_page("0|M|A|1")))
        .expect(1)
        .mount(&server)
        .await;

    let report = probe(config_for(&server)).check().await;

    assert_eq!(report.state, ServiceState::Unknown);
    assert!(report.message.contains("Missing unit"));
    assert_eq!(report.line().matches('|').count(), 1);
}
