use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(label: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("cat2meraki_{label}_{}_{}", std::process::id(), nanos));
    path
}

fn write_temp_file(label: &str, contents: &str) -> PathBuf {
    let path = temp_path(label);
    fs::write(&path, contents).expect("write temp file");
    path
}

#[test]
fn test_cli_scan_prints_stats() {
    let exe = env!("CARGO_BIN_EXE_cat2meraki");
    let output = Command::new(exe)
        .args(["scan", "-c", "fixtures/stack_running_config.txt"])
        .args(["--uplink", "Gi1/1/1", "--uplink", "GigabitEthernet2/1/1"])
        .output()
        .expect("run binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("SVIs found: 4"));
    assert!(stdout.contains("SVIs with a static address: 3"));
    assert!(stdout.contains("Stack members found: 2"));
    assert!(stdout.contains("Downlink ports found: 8"));
    assert!(stdout.contains("Uplink ports found: 2"));
    assert!(stdout.contains("Shut ports found: 2"));
    assert!(!stdout.contains("Warnings:"));
}

#[test]
fn test_cli_scan_lists_warnings() {
    let input = write_temp_file(
        "warnings",
        "interface GigabitEthernet1/0/1\n switchport access vlan 10\n switchport mode trunk\n!\n",
    );

    let exe = env!("CARGO_BIN_EXE_cat2meraki");
    let output = Command::new(exe)
        .args(["scan", "-c"])
        .arg(&input)
        .args(["--uplink", "Te1/1/1"])
        .output()
        .expect("run binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Warnings: 2"));
    assert!(stdout.contains("carries both access and trunk switchport directives"));
    assert!(stdout.contains("Uplink TenGigabitEthernet1/1/1 does not appear"));
}

#[test]
fn test_cli_scan_reports_duplicate_vlan() {
    let input = write_temp_file(
        "duplicate_vlan",
        "interface Vlan10\n ip address 10.0.1.1 255.255.255.0\n!\ninterface Vlan10\n!\n",
    );

    let exe = env!("CARGO_BIN_EXE_cat2meraki");
    let output = Command::new(exe)
        .args(["scan", "-c"])
        .arg(&input)
        .output()
        .expect("run binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: failed at stage SVIS_PARSED"));
    assert!(stderr.contains("VLAN 10 is defined twice"));
}

#[test]
fn test_cli_rejects_invalid_uplink() {
    let exe = env!("CARGO_BIN_EXE_cat2meraki");
    let output = Command::new(exe)
        .args(["scan", "-c", "fixtures/stack_running_config.txt"])
        .args(["--uplink", "Vlan10"])
        .output()
        .expect("run binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid port identifier"));
}

#[test]
fn test_cli_migrate_requires_serial() {
    let exe = env!("CARGO_BIN_EXE_cat2meraki");
    let output = Command::new(exe)
        .args(["migrate", "-c", "fixtures/stack_running_config.txt"])
        .args(["--api-key", "0123456789abcdef", "-g", "10.0.99.1"])
        .env_remove("MERAKI_SERIALS")
        .output()
        .expect("run binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--serial"));
}

#[test]
fn test_cli_verify_stops_before_network_on_mismatch() {
    let exe = env!("CARGO_BIN_EXE_cat2meraki");
    let output = Command::new(exe)
        .args(["verify", "-c", "fixtures/stack_running_config.txt"])
        .args(["--api-key", "0123456789abcdef", "-s", "Q2SW-AAAA-0001"])
        .args(["-g", "10.0.99.1"])
        .output()
        .expect("run binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed at stage PORTS_ALIGNED"));
    assert!(stderr.contains("supply exactly one serial per stack member"));
}
