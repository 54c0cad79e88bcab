//! Loading and manager seeding tests for switchboard-config.
// switchboard-config/tests/config_loading.rs
// =============================================================================
// Module: Config Loading Tests
// Description: File loading, format selection, and manager seeding.
// Purpose: Ensure configs on disk become working switch registries.
// =============================================================================

use std::fs;

use serde_json::json;
use switchboard_config::SwitchboardConfig;
use switchboard_core::InMemorySwitchStore;
use switchboard_core::RequestInput;
use switchboard_core::SwitchEventKind;
use switchboard_core::SwitchEventRecord;
use switchboard_core::SwitchState;

mod common;

use common::TestResult;
use common::assert_invalid;

/// Two-level rollout used by the seeding tests.
const ROLLOUT: &str = r#"
[[switches]]
name = "checkout:new_flow"
state = "selective"

[[switches.conditions]]
argument = "/user/age"
operator = { kind = "more_than", value = 18 }

[[switches]]
name = "checkout"
state = "selective"

[[switches.conditions]]
argument = "/region"
operator = { kind = "equals", value = "nz" }
"#;

// ============================================================================
// SECTION: Loading
// ============================================================================

#[test]
fn load_reads_toml_files() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("switchboard.toml");
    fs::write(&path, ROLLOUT).map_err(|err| err.to_string())?;
    let config = SwitchboardConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if config.switches.len() != 2 {
        return Err("both switches should load".to_string());
    }
    Ok(())
}

#[test]
fn load_reads_ron_files_by_extension() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("switchboard.ron");
    let ron = r#"(
        manager: (autocreate: true),
        switches: [
            (
                name: "beta",
                state: global,
                conditions: [
                    (argument: "/plan", operator: (kind: "equals", value: "pro")),
                ],
            ),
        ],
    )"#;
    fs::write(&path, ron).map_err(|err| err.to_string())?;
    let config = SwitchboardConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    let switch = config.switches.first().ok_or("switch missing")?;
    if !config.manager.autocreate || switch.state != SwitchState::Global {
        return Err("ron fields not parsed".to_string());
    }
    if switch.conditions.len() != 1 {
        return Err("ron conditions not parsed".to_string());
    }
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let result = SwitchboardConfig::load(Some(&dir.path().join("absent.toml")));
    assert_invalid(result, "config io error")
}

#[test]
fn oversized_file_is_rejected() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("big.toml");
    fs::write(&path, "#".repeat(1024 * 1024 + 1)).map_err(|err| err.to_string())?;
    assert_invalid(SwitchboardConfig::load(Some(&path)), "exceeds size limit")
}

#[test]
fn overlong_path_component_is_rejected() -> TestResult {
    let path = std::env::temp_dir().join("x".repeat(300));
    assert_invalid(SwitchboardConfig::load(Some(&path)), "component too long")
}

// ============================================================================
// SECTION: Manager Seeding
// ============================================================================

#[test]
fn seeded_manager_links_and_evaluates_switches() -> TestResult {
    let config = SwitchboardConfig::from_toml_str(ROLLOUT).map_err(|err| err.to_string())?;
    let mut manager =
        config.build_manager(InMemorySwitchStore::new()).map_err(|err| err.to_string())?;

    let child = manager.switch("checkout:new_flow").map_err(|err| err.to_string())?;
    if child.parent().map(|parent| parent.as_str()) != Some("checkout") {
        return Err("child registered first should be adopted".to_string());
    }
    if child.is_dirty() {
        return Err("seeded switches start clean".to_string());
    }

    manager.input([RequestInput::from(json!({"user": {"age": 30}, "region": "nz"}))]);
    if !manager.active("checkout:new_flow").map_err(|err| err.to_string())? {
        return Err("adult in nz should see the new flow".to_string());
    }
    manager.flush();
    manager.input([RequestInput::from(json!({"user": {"age": 30}, "region": "au"}))]);
    if manager.active("checkout:new_flow").map_err(|err| err.to_string())? {
        return Err("parent veto should apply outside nz".to_string());
    }
    Ok(())
}

#[test]
fn file_sink_records_seeding_events() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let log = dir.path().join("events.jsonl");
    let mut config = SwitchboardConfig::from_toml_str(ROLLOUT).map_err(|err| err.to_string())?;
    config.events.sink = switchboard_config::EventSink::File;
    config.events.path = Some(log.clone());
    config.build_manager(InMemorySwitchStore::new()).map_err(|err| err.to_string())?;

    let contents = fs::read_to_string(&log).map_err(|err| err.to_string())?;
    let records = contents
        .lines()
        .map(serde_json::from_str::<SwitchEventRecord>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| err.to_string())?;
    if records.len() != 2 || records.iter().any(|r| r.event != SwitchEventKind::Registered) {
        return Err("one registration event per seeded switch".to_string());
    }
    Ok(())
}
