use std::sync::{Arc, Mutex};
use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;
use uskill_client::{resolve_target, ClientTarget, SkillsClient, SkillsClientConfig};
use uskill_verify::{
    verify_instance, DispatchConfig, DispatchProgress, ProgressHandler, ReportSummary, Verdict,
};

fn client_for(server: &MockServer) -> SkillsClient {
    SkillsClient::new(SkillsClientConfig {
        base_url: server.base_url(),
        ..SkillsClientConfig::default()
    })
    .expect("client should be created")
}

#[tokio::test]
async fn verification_run_reports_every_skill_sorted_by_name() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/skills");
        then.status(200).json_body(json!({
            "skills": [
                {"name": "scene_save", "parameters": []},
                {"name": "asset_delete", "parameters": [
                    {"name": "assetPath", "type": "string", "required": true}
                ]},
                {"name": "material_create", "parameters": [
                    {"name": "name", "type": "string", "required": true},
                    {"name": "shader", "type": "string", "defaultValue": "Standard"},
                    {"name": "savePath", "type": "string", "required": true}
                ]}
            ]
        }));
    });
    let material = server.mock(|when, then| {
        when.method(POST).path("/skill/material_create").json_body_includes(
            json!({"name": "TestObject", "shader": "Standard", "savePath": "Assets"}).to_string(),
        );
        then.status(200).json_body(json!({"success": true}));
    });
    let delete = server.mock(|when, then| {
        when.method(POST).path("/skill/asset_delete").json_body_includes(
            json!({"assetPath": "Assets/__nonexistent_test_file__.txt"}).to_string(),
        );
        then.status(200)
            .json_body(json!({"success": false, "message": "not found"}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/skill/scene_save");
        then.status(500).json_body(json!({"error": "scene is untitled"}));
    });

    let progress_events = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&progress_events);
    let progress: ProgressHandler = Arc::new(move |_: DispatchProgress<'_>| {
        *counter.lock().expect("counter lock") += 1;
    });

    let report = verify_instance(&client_for(&server), &DispatchConfig::default(), Some(progress))
        .await
        .expect("verification run");

    material.assert();
    delete.assert();
    assert_eq!(*progress_events.lock().expect("counter lock"), 3);
    assert_eq!(
        report.summary,
        ReportSummary {
            total: 3,
            passed: 1,
            warned: 1,
            failed: 1,
        }
    );
    let rows: Vec<(&str, Verdict, &str)> = report
        .outcomes
        .iter()
        .map(|outcome| {
            (
                outcome.skill.as_str(),
                outcome.verdict,
                outcome.message.as_str(),
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            ("asset_delete", Verdict::Warn, "not found"),
            ("material_create", Verdict::Pass, "OK"),
            (
                "scene_save",
                Verdict::Fail,
                "HTTP 500: {\"error\":\"scene is untitled\"}"
            ),
        ]
    );
}

#[tokio::test]
async fn slow_skill_times_out_without_blocking_the_rest() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/skills");
        then.status(200).json_body(json!({
            "skills": [
                {"name": "editor_refresh", "parameters": []},
                {"name": "console_get_logs", "parameters": [
                    {"name": "filter", "type": "string", "required": true}
                ]}
            ]
        }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/skill/editor_refresh");
        then.status(200)
            .delay(Duration::from_millis(1_500))
            .json_body(json!({"success": true}));
    });
    let logs = server.mock(|when, then| {
        when.method(POST)
            .path("/skill/console_get_logs")
            .json_body_includes(json!({"filter": "*"}).to_string());
        then.status(200).json_body(json!({"logs": []}));
    });

    let report = verify_instance(
        &client_for(&server),
        &DispatchConfig {
            max_in_flight: 2,
            invoke_timeout: Duration::from_millis(200),
        },
        None,
    )
    .await
    .expect("verification run");

    logs.assert();
    assert_eq!(report.outcomes[0].skill, "console_get_logs");
    assert_eq!(report.outcomes[0].verdict, Verdict::Pass);
    assert_eq!(report.outcomes[1].skill, "editor_refresh");
    assert_eq!(report.outcomes[1].verdict, Verdict::Timeout);
    assert_eq!(report.outcomes[1].message, "Request timeout");
    assert_eq!(report.summary.failed, 1);
}

#[tokio::test]
async fn malformed_descriptor_only_fails_its_own_skill() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/skills");
        then.status(200).json_body(json!({
            "skills": [
                {"name": "scene_get_info", "parameters": []},
                {"name": "weird", "parameters": [{"type": "string", "required": true}]},
                {"name": "lenient", "parameters": [{"name": "x", "required": null}]}
            ]
        }));
    });
    let info = server.mock(|when, then| {
        when.method(POST).path("/skill/scene_get_info");
        then.status(200).json_body(json!({"success": true}));
    });
    let lenient = server.mock(|when, then| {
        when.method(POST).path("/skill/lenient").json_body(json!({}));
        then.status(200).json_body(json!({"success": true}));
    });
    let weird = server.mock(|when, then| {
        when.method(POST).path("/skill/weird");
        then.status(200).json_body(json!({"success": true}));
    });

    let report = verify_instance(&client_for(&server), &DispatchConfig::default(), None)
        .await
        .expect("one bad descriptor must not abort the run");

    info.assert();
    lenient.assert();
    weird.assert_hits(0);
    let rows: Vec<(&str, Verdict)> = report
        .outcomes
        .iter()
        .map(|outcome| (outcome.skill.as_str(), outcome.verdict))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("lenient", Verdict::Pass),
            ("scene_get_info", Verdict::Pass),
            ("weird", Verdict::Error),
        ]
    );
    assert!(report.outcomes[2]
        .message
        .starts_with("invalid skill descriptor"));
}

#[tokio::test]
async fn non_json_failure_body_is_an_error_row() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/skills");
        then.status(200)
            .json_body(json!({"skills": [{"name": "scene_save", "parameters": []}]}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/skill/scene_save");
        then.status(500).body("<html>boom</html>");
    });

    let report = verify_instance(&client_for(&server), &DispatchConfig::default(), None)
        .await
        .expect("report");

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].verdict, Verdict::Error);
    assert!(report.outcomes[0]
        .message
        .starts_with("malformed response body"));
}

#[tokio::test]
async fn catalog_failure_aborts_the_run() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/skills");
        then.status(500).body("compiling scripts");
    });
    let never_called = server.mock(|when, then| {
        when.method(POST);
        then.status(200);
    });

    let result = verify_instance(&client_for(&server), &DispatchConfig::default(), None).await;
    assert!(result.is_err());
    never_called.assert_hits(0);
}

#[tokio::test]
async fn registry_target_addresses_the_right_instance() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/skills");
        then.status(200).json_body(json!({"skills": [{"name": "scene_get_info"}]}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/skill/scene_get_info");
        then.status(200).json_body(json!({"sceneName": "SampleScene"}));
    });

    let tempdir = tempfile::tempdir().expect("tempdir");
    let registry_path = tempdir.path().join("registry.json");
    std::fs::write(
        &registry_path,
        json!({
            "/proj/A": {"id": "A1", "name": "Foo", "port": server.port()},
            "/proj/B": {"id": "B1", "name": "Bar", "port": 1}
        })
        .to_string(),
    )
    .expect("write registry");

    assert_eq!(
        resolve_target(&registry_path, "A1").expect("resolve"),
        server.port()
    );
    let client = SkillsClient::connect(&ClientTarget::Instance {
        token: "Foo".to_string(),
        registry_path,
    })
    .expect("client for registry target");
    let report = verify_instance(&client, &DispatchConfig::default(), None)
        .await
        .expect("verification run");
    assert_eq!(report.summary.passed, 1);
}
