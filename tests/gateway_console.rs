//! End-to-end tests against a mock gateway over HTTP.
//!
//! These tests verify:
//! - The credential header on every request
//! - Login, command execution, and credit reconciliation
//! - Rule submission and audit retrieval
//! - Credential persistence across restarts
//! - The interactive console with scripted input

use std::sync::Arc;

use httpmock::prelude::*;
use serde_json::json;
use tempfile::tempdir;

use gateway_console::config::ApiConfig;
use gateway_console::terminal::run_console;
use gateway_console::{
    CommandOutcome, ConsoleApp, ConsoleError, Credential, EntryKind, FileCredentialStore,
    HttpGateway, MemoryCredentialStore, RestoreOutcome, Role, RuleAction, SessionPhase,
};

const ADMIN_KEY: &str = "admin-secret-key";

fn gateway(server: &MockServer) -> Arc<HttpGateway> {
    let config = ApiConfig {
        base_url: server.base_url(),
        ..ApiConfig::default()
    };
    Arc::new(HttpGateway::new(&config).unwrap())
}

fn memory_app(server: &MockServer) -> ConsoleApp {
    ConsoleApp::new(gateway(server), Arc::new(MemoryCredentialStore::new()))
}

async fn mock_admin_identity(server: &MockServer, credits: i64) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/me").header("x-api-key", ADMIN_KEY);
            then.status(200)
                .json_body(json!({ "username": "root", "role": "admin", "credits": credits }));
        })
        .await
}

// ============================================================================
// Session
// ============================================================================

#[tokio::test]
async fn test_login_sends_credential_header() {
    let server = MockServer::start_async().await;
    let identity = mock_admin_identity(&server, 100).await;
    let app = memory_app(&server);

    let me = app.manager.login(Credential::new(ADMIN_KEY)).await.unwrap();

    identity.assert_async().await;
    assert_eq!(me.username, "root");
    assert_eq!(me.role, Role::Admin);
    assert_eq!(me.credits, 100);
    assert_eq!(app.session.phase().await, SessionPhase::Authenticated);

    let transcript = app.session.transcript().await;
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript.entries()[0].text(), "System initialized. Welcome, root.");
}

#[tokio::test]
async fn test_invalid_key_is_denied() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/me").header("x-api-key", "wrong-key");
            then.status(401).json_body(json!({ "detail": "Invalid API Key" }));
        })
        .await;
    let app = memory_app(&server);

    let err = app.manager.login(Credential::new("wrong-key")).await.unwrap_err();

    assert!(matches!(err, ConsoleError::AuthenticationFailed { .. }));
    assert_eq!(app.session.phase().await, SessionPhase::Anonymous);
    assert!(app.session.identity().await.is_none());
    assert!(app.session.transcript().await.is_empty());
}

#[tokio::test]
async fn test_unreachable_gateway_denies_login() {
    let app = ConsoleApp::new(
        Arc::new(
            HttpGateway::new(&ApiConfig {
                base_url: "http://127.0.0.1:1".to_string(),
                ..ApiConfig::default()
            })
            .unwrap(),
        ),
        Arc::new(MemoryCredentialStore::new()),
    );

    let err = app.manager.login(Credential::new(ADMIN_KEY)).await.unwrap_err();

    assert!(err.is_transport());
    assert_eq!(app.session.phase().await, SessionPhase::Anonymous);
}

#[tokio::test]
async fn test_credential_survives_restart() {
    let server = MockServer::start_async().await;
    let identity = mock_admin_identity(&server, 100).await;
    let dir = tempdir().unwrap();
    let storage = dir.path().join("storage.json");

    let first = ConsoleApp::new(gateway(&server), Arc::new(FileCredentialStore::new(&storage)));
    first.manager.login(Credential::new(ADMIN_KEY)).await.unwrap();

    let second = ConsoleApp::new(gateway(&server), Arc::new(FileCredentialStore::new(&storage)));
    let outcome = second.manager.restore(true).await.unwrap();

    assert!(matches!(outcome, RestoreOutcome::Restored(ref me) if me.username == "root"));
    identity.assert_hits_async(2).await;

    second.manager.logout().await;
    let third = ConsoleApp::new(gateway(&server), Arc::new(FileCredentialStore::new(&storage)));
    assert!(matches!(
        third.manager.restore(true).await.unwrap(),
        RestoreOutcome::NoCredential
    ));
}

// ============================================================================
// Commands
// ============================================================================

#[tokio::test]
async fn test_execute_then_block() {
    let server = MockServer::start_async().await;
    mock_admin_identity(&server, 100).await;
    let status = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/commands/execute")
                .header("x-api-key", ADMIN_KEY)
                .json_body(json!({ "command": "status" }));
            then.status(200).json_body(json!({
                "status": "EXECUTED",
                "message": "All systems nominal",
                "credits_remaining": 99
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/commands/execute")
                .json_body(json!({ "command": "rm -rf /" }));
            then.status(200).json_body(json!({
                "status": "BLOCKED",
                "message": "Matched rule ^rm",
                "credits_remaining": 99
            }));
        })
        .await;

    let app = memory_app(&server);
    app.manager.login(Credential::new(ADMIN_KEY)).await.unwrap();

    let outcome = app.console.execute("status").await.unwrap();
    status.assert_async().await;
    assert!(matches!(outcome, CommandOutcome::Executed(_)));
    assert_eq!(app.session.identity().await.unwrap().credits, 99);

    let outcome = app.console.execute("rm -rf /").await.unwrap();
    assert!(matches!(outcome, CommandOutcome::Rejected(_)));
    assert_eq!(app.session.identity().await.unwrap().credits, 99);

    let transcript = app.session.transcript().await;
    let entries: Vec<(EntryKind, &str)> = transcript
        .entries()
        .iter()
        .map(|e| (e.kind(), e.text()))
        .collect();
    assert_eq!(
        entries,
        vec![
            (EntryKind::Info, "System initialized. Welcome, root."),
            (EntryKind::UserEcho, "> status"),
            (EntryKind::Success, "[EXECUTED] All systems nominal"),
            (EntryKind::UserEcho, "> rm -rf /"),
            (EntryKind::Error, "[BLOCKED] Matched rule ^rm"),
        ]
    );
}

#[tokio::test]
async fn test_server_failure_keeps_credits() {
    let server = MockServer::start_async().await;
    mock_admin_identity(&server, 100).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/commands/execute");
            then.status(500).body("Internal Server Error");
        })
        .await;

    let app = memory_app(&server);
    app.manager.login(Credential::new(ADMIN_KEY)).await.unwrap();

    let outcome = app.console.execute("status").await.unwrap();

    assert!(matches!(outcome, CommandOutcome::Failed(_)));
    assert_eq!(app.session.identity().await.unwrap().credits, 100);
    let transcript = app.session.transcript().await;
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript.last().unwrap().kind(), EntryKind::Error);
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
async fn test_rule_is_posted_and_draft_reset() {
    let server = MockServer::start_async().await;
    mock_admin_identity(&server, 100).await;
    let rules = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rules")
                .header("x-api-key", ADMIN_KEY)
                .json_body(json!({
                    "pattern": "^git (status|log)",
                    "action": "allow",
                    "description": "read-only git"
                }));
            then.status(200).json_body(json!({ "id": 7 }));
        })
        .await;

    let app = memory_app(&server);
    app.manager.login(Credential::new(ADMIN_KEY)).await.unwrap();
    app.rules.set_pattern("^git (status|log)").await.unwrap();
    app.rules.set_action(RuleAction::Allow).await.unwrap();
    app.rules.set_description("read-only git").await.unwrap();

    let submitted = app.rules.submit_rule().await.unwrap();

    rules.assert_async().await;
    assert_eq!(submitted.action, RuleAction::Allow);
    assert_eq!(app.rules.draft().await, Default::default());
}

#[tokio::test]
async fn test_invalid_rule_keeps_draft() {
    let server = MockServer::start_async().await;
    mock_admin_identity(&server, 100).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/rules");
            then.status(400).json_body(json!({ "detail": "Invalid regex pattern" }));
        })
        .await;

    let app = memory_app(&server);
    app.manager.login(Credential::new(ADMIN_KEY)).await.unwrap();
    app.rules.set_pattern("([").await.unwrap();

    let err = app.rules.submit_rule().await.unwrap_err();

    assert!(
        matches!(err, ConsoleError::ValidationFailed { ref detail } if detail == "Invalid regex pattern")
    );
    assert_eq!(app.rules.draft().await.pattern, "([");
}

#[tokio::test]
async fn test_audit_logs_are_fetched() {
    let server = MockServer::start_async().await;
    mock_admin_identity(&server, 100).await;
    let audit = server
        .mock_async(|when, then| {
            when.method(GET).path("/audit-logs").header("x-api-key", ADMIN_KEY);
            then.status(200).json_body(json!([
                {
                    "id": 1,
                    "timestamp": "2024-05-01T12:00:00Z",
                    "username": "root",
                    "command": "status",
                    "status": "EXECUTED"
                },
                {
                    "id": 2,
                    "timestamp": "2024-05-01T12:00:05",
                    "username": "root",
                    "command": "rm -rf /",
                    "status": "BLOCKED"
                }
            ]));
        })
        .await;

    let app = memory_app(&server);
    app.manager.login(Credential::new(ADMIN_KEY)).await.unwrap();

    let records = app.audit.refresh().await.unwrap();

    audit.assert_async().await;
    assert_eq!(records.len(), 2);
    assert!(records[0].is_executed());
    assert!(!records[1].is_executed());
    assert_eq!(app.audit.records().await, records);
}

// ============================================================================
// Interactive console
// ============================================================================

#[tokio::test]
async fn test_console_session_script() {
    let server = MockServer::start_async().await;
    mock_admin_identity(&server, 100).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/commands/execute");
            then.status(200).json_body(json!({
                "status": "EXECUTED",
                "message": "ok",
                "credits_remaining": 99
            }));
        })
        .await;

    let app = memory_app(&server);
    let input: &[u8] = b"admin-secret-key\nstatus\n:quit\n";
    let mut output = Vec::new();

    run_console(&app, input, &mut output).await.unwrap();

    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("IDENTITY root [admin]  CREDITS 100"));
    assert!(output.contains("System initialized. Welcome, root."));

    // The new balance follows the result line without asking for it
    let result = output.find("  ok  [EXECUTED] ok").unwrap();
    let balance = output.find("IDENTITY root [admin]  CREDITS 99").unwrap();
    assert!(output.find("> status").unwrap() < result);
    assert!(result < balance);
}

#[tokio::test]
async fn test_console_denies_bad_key_then_stops_at_eof() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/me");
            then.status(401).json_body(json!({ "detail": "Invalid API Key" }));
        })
        .await;

    let app = memory_app(&server);
    let input: &[u8] = b"nope\n";
    let mut output = Vec::new();

    run_console(&app, input, &mut output).await.unwrap();

    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("access denied: invalid API key"));
    assert_eq!(app.session.phase().await, SessionPhase::Anonymous);
}
