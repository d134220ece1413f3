//! Integration tests: config load, identity store, probe set shape, change
//! gate, and delivery against an in-process HTTP endpoint.

use posture_agent::{
    config::AgentConfig,
    identity::IdentityStore,
    platform::HostOs,
    probes::{self, CheckSet, ProbeResult},
    report::{should_report, HealthReport, ReportBuilder},
    reporter::{DeliveryError, Reporter},
    scheduler::{CycleError, CycleOutcome, Scheduler},
};
use chrono::Utc;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::mpsc;
use std::thread;

fn unknown_checks() -> CheckSet {
    CheckSet {
        disk_encryption: ProbeResult::Unknown,
        os_updated: ProbeResult::Unknown,
        antivirus_active: ProbeResult::Unknown,
        sleep_settings_ok: ProbeResult::Unknown,
    }
}

fn compliant_checks() -> CheckSet {
    CheckSet {
        disk_encryption: ProbeResult::Compliant,
        os_updated: ProbeResult::Compliant,
        antivirus_active: ProbeResult::Compliant,
        sleep_settings_ok: ProbeResult::Compliant,
    }
}

fn sample_report(checks: CheckSet) -> HealthReport {
    HealthReport {
        machine_id: "machine-1".to_string(),
        timestamp: Utc::now(),
        os_name: "TestOS".to_string(),
        os_version: "1.0".to_string(),
        checks,
    }
}

/// Read one HTTP request off the stream: headers, then a content-length body.
fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break None,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break Some(pos + 4);
                }
            }
        }
    };
    if let Some(end) = header_end {
        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let content_length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < end + content_length {
            match stream.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// Serve the given status codes, one per connection, and forward each raw
/// request for assertions.
fn spawn_endpoint(responses: Vec<u16>) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral");
    let addr = listener.local_addr().expect("local addr");
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for status in responses {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let request = read_request(&mut stream);
            let _ = tx.send(request);
            let reason = if status == 200 { "OK" } else { "Internal Server Error" };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    (format!("http://{addr}/api/health-reports"), rx)
}

#[test]
fn config_load_default() {
    let c = AgentConfig::load(Path::new("nonexistent.json"));
    assert_eq!(c.api_endpoint, "http://localhost:3000/api/health-reports");
    assert_eq!(c.check_interval_secs, 900);
    assert!(c.log.json);
}

#[test]
fn config_partial_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"check_interval_secs": 60}"#).unwrap();
    let c = AgentConfig::load(&path);
    assert_eq!(c.check_interval_secs, 60);
    assert_eq!(c.api_endpoint, "http://localhost:3000/api/health-reports");
}

#[test]
fn identity_get_or_create_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = IdentityStore::new(dir.path().join("nested").join(".machine_id"));
    let first = store.get_or_create();
    let second = store.get_or_create();
    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert!(dir.path().join("nested").join(".machine_id").exists());
}

#[test]
fn identity_reads_existing_file_trimmed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".machine_id");
    std::fs::write(&path, "  seeded-machine-id \n").unwrap();
    let store = IdentityStore::new(path);
    assert_eq!(store.get_or_create(), "seeded-machine-id");
}

#[test]
fn unsupported_os_yields_all_unknown() {
    let checks = probes::run_all(HostOs::Unsupported);
    assert_eq!(checks, unknown_checks());
}

#[test]
fn probe_result_wire_format() {
    let mixed = CheckSet {
        disk_encryption: ProbeResult::Compliant,
        os_updated: ProbeResult::NonCompliant,
        antivirus_active: ProbeResult::Unknown,
        sleep_settings_ok: ProbeResult::Compliant,
    };
    let value = serde_json::to_value(mixed).unwrap();
    assert_eq!(value["disk_encryption"], serde_json::json!(true));
    assert_eq!(value["os_updated"], serde_json::json!(false));
    assert_eq!(value["antivirus_active"], serde_json::Value::Null);

    let back: CheckSet = serde_json::from_value(value).unwrap();
    assert_eq!(back, mixed);
}

#[test]
fn report_carries_exactly_the_four_checks() {
    let dir = tempfile::tempdir().unwrap();
    let identity = IdentityStore::new(dir.path().join(".machine_id"));
    let builder = ReportBuilder::new(&identity, HostOs::Unsupported);
    let report = builder.build();

    assert!(!report.machine_id.is_empty());
    let value = serde_json::to_value(&report).unwrap();
    let checks = value["checks"].as_object().unwrap();
    let mut keys: Vec<&str> = checks.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        ["antivirus_active", "disk_encryption", "os_updated", "sleep_settings_ok"]
    );
}

#[test]
fn first_report_is_always_sent() {
    let report = sample_report(unknown_checks());
    assert!(should_report(&report, None));
}

#[test]
fn identical_checks_are_not_resent() {
    let baseline = sample_report(compliant_checks());
    let mut candidate = sample_report(compliant_checks());
    candidate.timestamp = Utc::now();
    candidate.os_version = "2.0".to_string();
    assert!(!should_report(&candidate, Some(&baseline)));
}

#[test]
fn single_check_flip_triggers_report() {
    let baseline = sample_report(compliant_checks());
    let mut candidate = sample_report(compliant_checks());
    candidate.checks.disk_encryption = ProbeResult::NonCompliant;
    assert!(should_report(&candidate, Some(&baseline)));
}

#[test]
fn flip_to_unknown_counts_as_change() {
    let baseline = sample_report(compliant_checks());
    let mut candidate = sample_report(compliant_checks());
    candidate.checks.os_updated = ProbeResult::Unknown;
    assert!(should_report(&candidate, Some(&baseline)));
}

#[test]
fn delivered_report_body_and_headers() {
    let (endpoint, rx) = spawn_endpoint(vec![200]);
    let reporter = Reporter::new(endpoint, HostOs::Unsupported).unwrap();
    reporter.deliver(&sample_report(compliant_checks())).unwrap();

    let request = rx.recv().unwrap();
    let lower = request.to_ascii_lowercase();
    assert!(lower.starts_with("post /api/health-reports"));
    assert!(lower.contains("content-type: application/json"));
    assert!(lower.contains("user-agent: posture-agent/unknown"));

    let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
    let value: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(value["machine_id"], serde_json::json!("machine-1"));
    for check in ["disk_encryption", "os_updated", "antivirus_active", "sleep_settings_ok"] {
        assert_eq!(value["checks"][check], serde_json::json!(true));
    }
}

#[test]
fn non_200_status_is_a_delivery_error() {
    let (endpoint, _rx) = spawn_endpoint(vec![500]);
    let reporter = Reporter::new(endpoint, HostOs::Unsupported).unwrap();
    let err = reporter.deliver(&sample_report(unknown_checks())).unwrap_err();
    match err {
        DeliveryError::Rejected { status, .. } => assert_eq!(status.as_u16(), 500),
        other => panic!("expected rejection, got {other}"),
    }
}

#[test]
fn connection_failure_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let reporter = Reporter::new(format!("http://{addr}/"), HostOs::Unsupported).unwrap();
    let err = reporter.deliver(&sample_report(unknown_checks())).unwrap_err();
    assert!(matches!(err, DeliveryError::Transport(_)));
}

#[test]
fn second_cycle_with_unchanged_posture_skips_delivery() {
    let (endpoint, rx) = spawn_endpoint(vec![200]);
    let dir = tempfile::tempdir().unwrap();
    let identity = IdentityStore::new(dir.path().join(".machine_id"));
    let builder = ReportBuilder::new(&identity, HostOs::Unsupported);
    let reporter = Reporter::new(endpoint, HostOs::Unsupported).unwrap();
    let mut scheduler = Scheduler::new(builder, reporter, 900);

    assert_eq!(scheduler.run_cycle().unwrap(), CycleOutcome::Delivered);
    assert!(scheduler.baseline().is_some());
    assert_eq!(scheduler.run_cycle().unwrap(), CycleOutcome::Unchanged);

    // Exactly one request reached the endpoint.
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err());
}

#[test]
fn failed_delivery_keeps_baseline_and_retries_next_cycle() {
    let (endpoint, rx) = spawn_endpoint(vec![500, 200]);
    let dir = tempfile::tempdir().unwrap();
    let identity = IdentityStore::new(dir.path().join(".machine_id"));
    let builder = ReportBuilder::new(&identity, HostOs::Unsupported);
    let reporter = Reporter::new(endpoint, HostOs::Unsupported).unwrap();
    let mut scheduler = Scheduler::new(builder, reporter, 900);

    let err = scheduler.run_cycle().unwrap_err();
    assert!(matches!(
        err,
        CycleError::Delivery(DeliveryError::Rejected { .. })
    ));
    assert!(scheduler.baseline().is_none());

    // Unchanged posture still re-attempts: the failed report never became
    // the baseline.
    assert_eq!(scheduler.run_cycle().unwrap(), CycleOutcome::Delivered);
    assert!(scheduler.baseline().is_some());
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_ok());
}
