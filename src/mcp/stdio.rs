//! Line-delimited JSON-RPC 2.0 over stdio.
//!
//! One request per line, one response per line. stdout carries only
//! protocol frames; all logging goes to stderr. Every failure, from a
//! parse error to an unknown device, flattens to a single error shape so
//! clients have exactly one thing to check.

use std::io::{BufRead, Write};

use anyhow::anyhow;
use serde_json::{json, Value};
use tracing::debug;

use super::server::{list_tools, PedalwireMcp};
use crate::executor::DeviceExecutor;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": "pedalwire",
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

fn error_response(id: Value, message: String) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": -1,
            "message": message
        }
    })
    .to_string()
}

/// Handle one request line. Returns None when no response is owed
/// (notifications).
pub fn handle_line<E: DeviceExecutor>(line: &str, mcp: &mut PedalwireMcp<E>) -> Option<String> {
    let request: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => return Some(error_response(Value::Null, format!("Parse error: {}", e))),
    };

    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request
        .get("method")
        .and_then(|m| m.as_str())
        .unwrap_or("");
    let params = request.get("params").cloned().unwrap_or_else(|| json!({}));

    if method.starts_with("notifications/") {
        debug!("notification: {}", method);
        return None;
    }

    let result = match method {
        "initialize" => Ok(initialize_result()),
        "tools/list" => Ok(list_tools()),
        "tools/call" => {
            let tool = params.get("name").and_then(|n| n.as_str()).unwrap_or("");
            let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
            mcp.handle_tool_call(tool, &arguments).map(|value| {
                json!({
                    "content": [{
                        "type": "text",
                        "text": serde_json::to_string_pretty(&value).unwrap_or_default()
                    }]
                })
            })
        }
        _ => Err(anyhow!("Method not found: {}", method)),
    };

    let response = match result {
        Ok(value) => json!({ "jsonrpc": "2.0", "id": id, "result": value }).to_string(),
        Err(e) => error_response(id, format!("{:#}", e)),
    };
    Some(response)
}

/// Request loop over any line source. The `initialize` result goes out
/// first so bare pipes can confirm the server is alive before sending
/// anything. A read error (a client hanging up mid-line, bytes that are
/// not UTF-8) ends the session the same way a clean EOF does.
fn serve_lines<R: BufRead, W: Write, E: DeviceExecutor>(
    reader: R,
    mut writer: W,
    mcp: &mut PedalwireMcp<E>,
) -> std::io::Result<()> {
    let banner = json!({ "jsonrpc": "2.0", "id": null, "result": initialize_result() });
    writeln!(writer, "{}", banner)?;
    writer.flush()?;

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        if let Some(response) = handle_line(&line, mcp) {
            writeln!(writer, "{}", response)?;
            writer.flush()?;
        }
    }
    Ok(())
}

/// Serve stdin until it closes.
pub fn serve<E: DeviceExecutor>(mcp: &mut PedalwireMcp<E>) -> std::io::Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    serve_lines(stdin.lock(), stdout.lock(), mcp)
}
