//! Stdio tool server — subprocess transport speaking JSON-RPC.
//!
//! Spawns the server as a child process and exchanges newline-delimited
//! JSON-RPC messages over its stdin/stdout. The connection is a scoped
//! resource: `shutdown` closes stdin, waits briefly, then kills; the
//! child is additionally killed on drop so no exit path leaks a
//! subprocess.

use std::collections::BTreeMap;
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::tools::ToolCatalog;
use crate::types::{Error, Result, ServerConfig};

/// Launch parameters for a stdio tool server subprocess.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StdioServerParams {
    /// Executable to spawn.
    pub command: String,

    /// Arguments passed to the executable.
    #[serde(default)]
    pub args: Vec<String>,

    /// Extra environment variables for the subprocess.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl StdioServerParams {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            env: BTreeMap::new(),
        }
    }
}

struct ServerIo {
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// A connected stdio tool server.
pub struct StdioToolServer {
    name: String,
    config: ServerConfig,
    io: Mutex<ServerIo>,
    child: Mutex<Child>,
}

impl std::fmt::Debug for StdioToolServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdioToolServer")
            .field("name", &self.name)
            .finish()
    }
}

impl StdioToolServer {
    /// Spawn the subprocess and perform the initialize handshake.
    pub async fn connect(
        name: impl Into<String>,
        params: &StdioServerParams,
        config: ServerConfig,
    ) -> Result<Self> {
        let name = name.into();
        if params.command.is_empty() {
            return Err(Error::configuration(format!(
                "Tool server '{}' has no command configured",
                name
            )));
        }

        let mut child = Command::new(&params.command)
            .args(&params.args)
            .envs(&params.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::transport(format!("failed to spawn '{}': {}", params.command, e))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::transport("child stdin not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::transport("child stdout not captured"))?;

        let server = Self {
            name,
            config,
            io: Mutex::new(ServerIo {
                stdin,
                stdout: BufReader::new(stdout),
            }),
            child: Mutex::new(child),
        };

        server
            .request(
                "initialize",
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {
                        "name": "warden-core",
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            )
            .await?;
        server.notify("notifications/initialized", json!({})).await?;

        info!(server = %server.name, "tool server connected");
        Ok(server)
    }

    /// Send one request and wait for its response, skipping unrelated
    /// messages (notifications, stale responses).
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = Uuid::new_v4().to_string();
        let message = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let mut io = self.io.lock().await;
        write_line(&mut io.stdin, &message).await?;

        // Cap enforced during the read: one byte past the limit stops
        // buffering, so an oversized line never allocates unbounded.
        let limit = self.config.max_response_bytes as u64 + 1;

        loop {
            let mut line = String::new();
            let read = tokio::time::timeout(
                self.config.request_timeout,
                (&mut io.stdout).take(limit).read_line(&mut line),
            )
            .await
            .map_err(|_| Error::transport(format!("request '{}' timed out", method)))?
            .map_err(|e| Error::transport(format!("failed to read from server: {}", e)))?;

            if read == 0 {
                return Err(Error::transport("server closed connection"));
            }
            if line.len() > self.config.max_response_bytes {
                return Err(Error::transport(format!(
                    "response line too large: {} bytes exceeds {}",
                    line.len(),
                    self.config.max_response_bytes
                )));
            }
            if line.trim().is_empty() {
                continue;
            }

            let message: Value = serde_json::from_str(line.trim())
                .map_err(|e| Error::transport(format!("malformed server message: {}", e)))?;

            match match_response(&message, &id) {
                Some(Ok(result)) => return Ok(result),
                Some(Err(failure)) => {
                    return Err(Error::transport(format!(
                        "server rejected '{}': {}",
                        method, failure
                    )))
                }
                None => {
                    debug!(server = %self.name, "skipping unrelated server message");
                }
            }
        }
    }

    async fn notify(&self, method: &str, params: Value) -> Result<()> {
        let message = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });
        let mut io = self.io.lock().await;
        write_line(&mut io.stdin, &message).await
    }

    /// Terminate the subprocess: close stdin, give it a grace period,
    /// then kill. Consumes the connection.
    pub async fn shutdown(self) -> Result<()> {
        let grace = self.config.shutdown_grace;
        drop(self.io.into_inner());

        let mut child = self.child.into_inner();
        match tokio::time::timeout(grace, child.wait()).await {
            Ok(status) => {
                status?;
            }
            Err(_) => {
                child.start_kill()?;
                child.wait().await?;
            }
        }

        info!(server = %self.name, "tool server shut down");
        Ok(())
    }
}

#[async_trait::async_trait]
impl super::ToolServer for StdioToolServer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_tools(&self) -> Result<ToolCatalog> {
        let result = self.request("tools/list", json!({})).await?;
        let tools = result
            .get("tools")
            .ok_or_else(|| Error::transport("tools/list response missing 'tools'"))?;
        ToolCatalog::from_wire(tools)
    }

    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value> {
        self.request(
            "tools/call",
            json!({ "name": tool, "arguments": arguments }),
        )
        .await
    }
}

async fn write_line(stdin: &mut ChildStdin, message: &Value) -> Result<()> {
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    // Pipe failures are connection loss (server crashed or closed its
    // end), not generic I/O.
    stdin
        .write_all(&line)
        .await
        .map_err(|e| Error::transport(format!("failed to write to server: {}", e)))?;
    stdin
        .flush()
        .await
        .map_err(|e| Error::transport(format!("failed to write to server: {}", e)))?;
    Ok(())
}

/// Classify one incoming message against an outstanding request id.
///
/// `None` means unrelated (notification or different id); otherwise the
/// request's result or its error rendered as a message.
fn match_response(message: &Value, id: &str) -> Option<std::result::Result<Value, String>> {
    // A message carrying a method is a request or notification, not a
    // response, even if an id is present (e.g. an echoing server).
    if message.get("method").is_some() {
        return None;
    }
    if message.get("id").and_then(|v| v.as_str()) != Some(id) {
        return None;
    }
    if let Some(error) = message.get("error") {
        let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(0);
        let text = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error");
        return Some(Err(format!("{} (code {})", text, code)));
    }
    Some(Ok(message.get("result").cloned().unwrap_or(Value::Null)))
}

// =============================================================================
// Tests
// =============================================================================
