//! Tests for the file-driven batch runner.

use std::fs;

use cli::batch::{Action, AutoActivation, BatchError, BatchInput, BatchRunner, NodeSpec};
use corelib::TopologyConfig;
use serde_json::{json, Value};
use tempfile::tempdir;

fn spec(id: &str, kind: &str, ip: &str) -> NodeSpec {
    NodeSpec {
        id: id.into(),
        kind: kind.into(),
        ip: ip.into(),
        connections: Vec::new(),
    }
}

#[test]
fn test_auto_activation_by_identifier() {
    let input = BatchInput {
        nodes: vec![
            spec("server-1", "server", "192.168.1.1"),
            spec("client-1", "client", "192.168.1.100"),
        ],
        actions: Vec::new(),
    };
    let report = BatchRunner::default().run(input);

    assert!(report.nodes[0].active, "server-1 is auto-activated");
    assert!(!report.nodes[1].active, "client-1 is left inactive");
}

#[test]
fn test_keyword_matches_identifier_not_type() {
    let input = BatchInput {
        nodes: vec![spec("edge", "router", "10.0.0.1")],
        actions: Vec::new(),
    };
    let report = BatchRunner::default().run(input);
    assert!(!report.nodes[0].active);
}

#[test]
fn test_actions_replayed_in_order() {
    let input = BatchInput {
        nodes: vec![
            spec("server-1", "server", "192.168.1.1"),
            spec("client-1", "client", "192.168.1.100"),
        ],
        actions: vec![
            Action::SendData {
                source_index: 1,
                target_index: 0,
                data: "GET /".into(),
            },
            Action::Activate { node_index: 1 },
            Action::SendData {
                source_index: 1,
                target_index: 0,
                data: "GET /".into(),
            },
            Action::Deactivate { node_index: 0 },
            Action::Activate { node_index: 7 },
            Action::SendData {
                source_index: -1,
                target_index: 0,
                data: "x".into(),
            },
        ],
    };
    let report = BatchRunner::default().run(input);

    let results: Vec<bool> = report.actions.iter().map(|a| a.success).collect();
    assert_eq!(results, [false, true, true, true, false, false]);
    assert!(!report.nodes[0].active);
    assert!(report.nodes[1].active);
}

#[test]
fn test_connectivity_from_node_spec() {
    let mut client = spec("client-1", "client", "192.168.1.100");
    client.connections = vec!["server-1".into()];
    let input = BatchInput {
        nodes: vec![spec("server-1", "server", "192.168.1.1"), client],
        actions: vec![
            Action::Activate { node_index: 1 },
            Action::SendData {
                source_index: 1,
                target_index: 0,
                data: "ping".into(),
            },
            Action::SendData {
                source_index: 0,
                target_index: 1,
                data: "pong".into(),
            },
        ],
    };
    let runner = BatchRunner::new(TopologyConfig::connected(), AutoActivation::default());
    let report = runner.run(input);

    assert!(report.actions[1].success);
    assert!(!report.actions[2].success, "server-1 declared no connections");
}

#[test]
fn test_run_file_writes_report() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("input.json");
    let output_path = dir.path().join("output.json");

    let input = json!({
        "nodes": [
            {"id": "server-1", "type": "server", "ip": "192.168.1.1"},
            {"id": "client-1", "type": "client", "ip": "192.168.1.100"}
        ],
        "actions": [
            {"type": "activate", "nodeIndex": 1},
            {"type": "sendData", "sourceIndex": 1, "targetIndex": 0, "data": "GET /api/data"}
        ]
    });
    fs::write(&input_path, input.to_string()).unwrap();

    BatchRunner::new(TopologyConfig::default(), AutoActivation::disabled())
        .run_file(&input_path, &output_path)
        .unwrap();

    let written = fs::read_to_string(&output_path).unwrap();
    assert!(written.contains("\n  \"nodes\""), "Report is pretty-printed");

    let report: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(
        report,
        json!({
            "nodes": [
                {"id": "server-1", "type": "server", "ip": "192.168.1.1", "active": false},
                {"id": "client-1", "type": "client", "ip": "192.168.1.100", "active": true}
            ],
            "actions": [
                {"type": "activate", "nodeIndex": 1, "success": true},
                {"type": "sendData", "sourceIndex": 1, "targetIndex": 0, "data": "GET /api/data", "success": false}
            ]
        })
    );
}

#[test]
fn test_unknown_action_type_is_skipped() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("input.json");
    let output_path = dir.path().join("output.json");

    let input = json!({
        "nodes": [{"id": "server-1", "type": "server", "ip": "192.168.1.1"}],
        "actions": [
            {"type": "ping"},
            {"type": "deactivate", "nodeIndex": 0}
        ]
    });
    fs::write(&input_path, input.to_string()).unwrap();

    let report = BatchRunner::default()
        .run_file(&input_path, &output_path)
        .unwrap();

    assert_eq!(report.actions.len(), 1, "Unknown actions get no outcome");
    assert_eq!(report.actions[0].action, Action::Deactivate { node_index: 0 });
    assert!(report.actions[0].success);
    assert!(!report.nodes[0].active);
    assert!(output_path.exists());
}

#[test]
fn test_missing_input_is_fatal() {
    let dir = tempdir().unwrap();
    let err = BatchRunner::default()
        .run_file(&dir.path().join("missing.json"), &dir.path().join("out.json"))
        .unwrap_err();

    assert!(matches!(err, BatchError::Read { .. }));
    assert!(err.to_string().contains("missing.json"));
    assert!(!dir.path().join("out.json").exists(), "No report on fatal error");
}

#[test]
fn test_malformed_input_is_fatal() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("input.json");
    fs::write(&input_path, r#"{"nodes": [{"id": "a"}]}"#).unwrap();

    let err = BatchRunner::default()
        .run_file(&input_path, &dir.path().join("out.json"))
        .unwrap_err();
    assert!(matches!(err, BatchError::Parse { .. }));
}
