use cat2meraki::cli::run_with_args;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(label: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!(
        "cat2meraki_cli_{label}_{}_{}",
        std::process::id(),
        nanos
    ));
    path
}

fn write_temp_file(label: &str, contents: &str) -> PathBuf {
    let path = temp_path(label);
    fs::write(&path, contents).expect("write temp file");
    path
}

#[test]
fn run_with_args_scans_fixture() {
    let result = run_with_args([
        "cat2meraki",
        "scan",
        "-c",
        "fixtures/stack_running_config.txt",
        "--uplink",
        "Gi1/1/1,Gi2/1/1",
    ]);
    assert!(result.is_ok(), "{result:?}");
}

#[test]
fn run_with_args_reports_missing_config_file() {
    let missing = temp_path("missing");
    let result = run_with_args([
        "cat2meraki",
        "scan",
        "-c",
        missing.to_str().unwrap(),
    ]);

    let err = result.expect_err("should fail on missing file");
    assert!(err
        .to_string()
        .contains("Failed to retrieve configuration from"));
}

#[test]
fn run_with_args_requires_ssh_credentials() {
    let result = run_with_args([
        "cat2meraki",
        "scan",
        "--source",
        "ssh",
        "--host",
        "192.0.2.10",
    ]);

    let err = result.expect_err("should fail without credentials");
    assert!(err.to_string().contains("are required with --source ssh"));
}

#[test]
fn run_with_args_migrate_stops_on_parse_error() {
    let input = write_temp_file(
        "bad_svi",
        "interface Vlan10\n ip address 10.0.1.1\n!\ninterface GigabitEthernet1/0/1\n!\n",
    );

    let result = run_with_args([
        "cat2meraki",
        "migrate",
        "-c",
        input.to_str().unwrap(),
        "--api-key",
        "0123456789abcdef",
        "-s",
        "Q2SW-AAAA-0001",
        "-g",
        "10.0.1.254",
    ]);

    let err = result.expect_err("should fail on malformed address");
    let message = format!("{err:#}");
    assert!(message.contains("failed at stage SVIS_PARSED"), "{message}");
    assert!(message.contains("address without a subnet mask"), "{message}");
}

#[test]
fn run_with_args_migrate_rejects_serial_count_mismatch() {
    let result = run_with_args([
        "cat2meraki",
        "migrate",
        "--dry-run",
        "-c",
        "fixtures/stack_running_config.txt",
        "--api-key",
        "0123456789abcdef",
        "-s",
        "Q2SW-AAAA-0001",
        "-g",
        "10.0.99.1",
    ]);

    let err = result.expect_err("one serial for a two-member stack");
    let failure = err
        .downcast_ref::<cat2meraki::StageFailure>()
        .expect("stage failure");
    assert_eq!(failure.stage, cat2meraki::Stage::PortsAligned);
    assert_eq!(failure.kind(), Some(cat2meraki::ErrorKind::Precondition));
}
