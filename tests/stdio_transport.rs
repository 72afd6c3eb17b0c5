//! Stdio transport tests against a scripted fake server.
//!
//! Spawns a small shell script that answers the JSON-RPC handshake,
//! tool listing, and tool calls, validating the subprocess lifecycle
//! end to end (connect → list → call → shutdown).

#![cfg(unix)]

use std::io::Write;
use std::sync::Arc;

use serde_json::json;

use warden_core::server::{ServerConnection, StdioServerParams, StdioToolServer, ToolServer};
use warden_core::tools::{IdentityContext, ToolAccessGate, ToolFilter};
use warden_core::types::ServerConfig;

const FAKE_SERVER: &str = r#"
while IFS= read -r line; do
  case "$line" in
    *'"method":"initialize"'*)
      id=${line#*\"id\":\"}; id=${id%%\"*}
      printf '{"jsonrpc":"2.0","id":"%s","result":{"protocolVersion":"2024-11-05","capabilities":{},"serverInfo":{"name":"fake","version":"0.0.0"}}}\n' "$id"
      ;;
    *'"method":"notifications/initialized"'*)
      ;;
    *'"method":"tools/list"'*)
      id=${line#*\"id\":\"}; id=${id%%\"*}
      printf '{"jsonrpc":"2.0","id":"%s","result":{"tools":[{"name":"read_file","description":"Read a file"},{"name":"delete_file","description":"Delete a file"}]}}\n' "$id"
      ;;
    *'"method":"tools/call"'*)
      id=${line#*\"id\":\"}; id=${id%%\"*}
      printf '{"jsonrpc":"2.0","id":"%s","result":{"ok":true}}\n' "$id"
      ;;
  esac
done
"#;

fn script_params() -> (tempfile::NamedTempFile, StdioServerParams) {
    let mut script = tempfile::NamedTempFile::new().unwrap();
    script.write_all(FAKE_SERVER.as_bytes()).unwrap();
    script.flush().unwrap();
    let params = StdioServerParams::new(
        "sh",
        vec![script.path().to_string_lossy().into_owned()],
    );
    (script, params)
}

#[tokio::test]
async fn connect_list_call_shutdown_round_trip() {
    let (_script, params) = script_params();
    let server = StdioToolServer::connect("fake", &params, ServerConfig::default())
        .await
        .unwrap();

    let catalog = server.list_tools().await.unwrap();
    assert_eq!(catalog.names(), vec!["read_file", "delete_file"]);

    let result = server
        .call_tool("read_file", json!({"path": "a.txt"}))
        .await
        .unwrap();
    assert_eq!(result, json!({"ok": true}));

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn gated_connection_over_live_subprocess() {
    let (_script, params) = script_params();
    let server = Arc::new(
        StdioToolServer::connect("fake", &params, ServerConfig::default())
            .await
            .unwrap(),
    );

    let connection = ServerConnection::bind(
        server.clone(),
        ToolFilter::blocking(["delete_file"]),
        ToolAccessGate::default(),
    );

    let resolved = connection
        .visible_tools(&IdentityContext::new("Assistant"))
        .await
        .unwrap();
    assert_eq!(resolved.names(), vec!["read_file"]);

    drop(connection);
    if let Ok(server) = Arc::try_unwrap(server) {
        server.shutdown().await.unwrap();
    }
}

// Answers the handshake, then exits immediately.
const QUITTING_SERVER: &str = r#"
IFS= read -r line
id=${line#*\"id\":\"}; id=${id%%\"*}
printf '{"jsonrpc":"2.0","id":"%s","result":{"protocolVersion":"2024-11-05","capabilities":{},"serverInfo":{"name":"fake","version":"0.0.0"}}}\n' "$id"
IFS= read -r line
exit 0
"#;

#[tokio::test]
async fn server_exit_after_handshake_is_a_transport_error() {
    let mut script = tempfile::NamedTempFile::new().unwrap();
    script.write_all(QUITTING_SERVER.as_bytes()).unwrap();
    script.flush().unwrap();
    let params = StdioServerParams::new(
        "sh",
        vec![script.path().to_string_lossy().into_owned()],
    );

    let server = StdioToolServer::connect("quitter", &params, ServerConfig::default())
        .await
        .unwrap();

    // The subprocess is gone; the dead pipe must surface as connection
    // loss, not a generic I/O error.
    let err = server.list_tools().await.unwrap_err();
    assert!(
        matches!(err, warden_core::Error::Transport(_)),
        "expected transport error, got {:?}",
        err
    );
}

#[tokio::test]
async fn oversized_response_line_is_rejected_as_transport_error() {
    let (_script, params) = script_params();
    // The initialize response alone exceeds this cap.
    let config = ServerConfig {
        max_response_bytes: 64,
        ..Default::default()
    };

    let err = StdioToolServer::connect("fake", &params, config)
        .await
        .unwrap_err();
    match err {
        warden_core::Error::Transport(message) => {
            assert!(message.contains("too large"), "unexpected message: {}", message);
        }
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn unresponsive_server_times_out_as_transport_error() {
    // A server that never answers: consumes nothing, emits nothing.
    let params = StdioServerParams::new("sleep", vec!["60".to_string()]);
    let config = ServerConfig {
        request_timeout: std::time::Duration::from_millis(200),
        ..Default::default()
    };

    let err = StdioToolServer::connect("silent", &params, config)
        .await
        .unwrap_err();
    assert!(matches!(err, warden_core::Error::Transport(_)));
}
