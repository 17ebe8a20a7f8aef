use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::browser::driver::{Driver, ElementHandle};
use crate::error::CoreError;
use crate::extract::dom_analysis::DomSnapshot;

// ============================================================================
// NDJSON browser bridge
// ============================================================================

/// Request sent to the Node bridge over stdin, one JSON line per command.
#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum BridgeRequest {
    Navigate {
        url: String,
    },
    /// Wait up to timeout_ms for the selector to be present
    Find {
        selector: String,
        timeout_ms: u64,
    },
    Click {
        selector: String,
    },
    Fill {
        selector: String,
        value: String,
    },
    Text {
        selector: String,
    },
    Visible {
        selector: String,
    },
    /// Full fresh DOM snapshot of the current page
    Snapshot,
    Quit,
}

/// Response read from the bridge's stdout, one JSON line per command.
#[derive(Debug, Deserialize)]
pub struct BridgeResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub found: Option<bool>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub snapshot: Option<DomSnapshot>,
    #[serde(default)]
    pub ready: Option<bool>,
}

/// A persistent browser session backed by a long-lived Node helper that
/// keeps a Chromium instance open. Lifecycle here is launch and quit only;
/// everything else is per-command.
pub struct BrowserSession {
    child: Child,
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
}

const BRIDGE_SCRIPT: &str = "node/browser_bridge.js";

impl BrowserSession {
    pub fn launch() -> Result<Self, CoreError> {
        let mut child = Command::new("node")
            .arg(BRIDGE_SCRIPT)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CoreError::SubprocessSpawn {
                script: BRIDGE_SCRIPT.into(),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| CoreError::SessionProtocol {
            command: "launch".into(),
            detail: "failed to capture bridge stdin".into(),
        })?;

        let stdout = child.stdout.take().ok_or_else(|| CoreError::SessionProtocol {
            command: "launch".into(),
            detail: "failed to capture bridge stdout".into(),
        })?;

        let mut reader = BufReader::new(stdout);

        // Wait for the ready signal before accepting commands
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| CoreError::SessionProtocol {
                command: "launch".into(),
                detail: format!("failed to read ready signal: {}", e),
            })?;

        let response: BridgeResponse =
            serde_json::from_str(line.trim()).map_err(|e| CoreError::JsonParse {
                context: "bridge ready signal".into(),
                source: e,
            })?;

        if !response.ok || response.ready != Some(true) {
            return Err(CoreError::SessionProtocol {
                command: "launch".into(),
                detail: "did not receive ready signal from bridge".into(),
            });
        }

        Ok(BrowserSession {
            child,
            stdin,
            reader,
        })
    }

    fn send(&mut self, request: &BridgeRequest) -> Result<BridgeResponse, CoreError> {
        let json = serde_json::to_string(request).map_err(|e| CoreError::SessionProtocol {
            command: "serialize".into(),
            detail: e.to_string(),
        })?;

        writeln!(self.stdin, "{}", json).map_err(|e| CoreError::SessionProtocol {
            command: "write".into(),
            detail: format!("failed to write to bridge stdin: {}", e),
        })?;
        self.stdin.flush().map_err(|e| CoreError::SessionProtocol {
            command: "write".into(),
            detail: format!("failed to flush bridge stdin: {}", e),
        })?;

        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .map_err(|e| CoreError::SessionProtocol {
                command: "read".into(),
                detail: format!("failed to read from bridge stdout: {}", e),
            })?;

        if line.trim().is_empty() {
            return Err(CoreError::SessionProtocol {
                command: "read".into(),
                detail: "empty response from bridge (process may have died)".into(),
            });
        }

        serde_json::from_str(line.trim()).map_err(|e| CoreError::JsonParse {
            context: "bridge response".into(),
            source: e,
        })
    }

    fn send_ok(&mut self, request: &BridgeRequest, name: &str) -> Result<BridgeResponse, CoreError> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(CoreError::SessionProtocol {
                command: name.into(),
                detail: response.error.unwrap_or_else(|| "unknown error".into()),
            });
        }
        Ok(response)
    }

    /// Quit the bridge. Best-effort: no error if the process is already gone.
    pub fn quit(&mut self) -> Result<(), CoreError> {
        let _ = self.send(&BridgeRequest::Quit);
        let _ = self.child.wait();
        Ok(())
    }
}

impl Driver for BrowserSession {
    fn find(&mut self, selector: &str, timeout_ms: u64) -> Result<Option<ElementHandle>, CoreError> {
        let request = BridgeRequest::Find {
            selector: selector.to_string(),
            timeout_ms,
        };
        let response = self.send_ok(&request, "find")?;
        if response.found == Some(true) {
            Ok(Some(ElementHandle::new(selector)))
        } else {
            Ok(None)
        }
    }

    fn click(&mut self, handle: &ElementHandle) -> Result<(), CoreError> {
        let request = BridgeRequest::Click {
            selector: handle.selector.clone(),
        };
        self.send_ok(&request, "click")?;
        Ok(())
    }

    fn set_value(&mut self, handle: &ElementHandle, value: &str) -> Result<(), CoreError> {
        let request = BridgeRequest::Fill {
            selector: handle.selector.clone(),
            value: value.to_string(),
        };
        self.send_ok(&request, "fill")?;
        Ok(())
    }

    fn text(&mut self, handle: &ElementHandle) -> Result<String, CoreError> {
        let request = BridgeRequest::Text {
            selector: handle.selector.clone(),
        };
        let response = self.send_ok(&request, "text")?;
        Ok(response.text.unwrap_or_default())
    }

    fn is_displayed(&mut self, handle: &ElementHandle) -> Result<bool, CoreError> {
        let request = BridgeRequest::Visible {
            selector: handle.selector.clone(),
        };
        let response = self.send_ok(&request, "visible")?;
        Ok(response.visible.unwrap_or(false))
    }

    fn snapshot(&mut self) -> Result<DomSnapshot, CoreError> {
        let response = self.send_ok(&BridgeRequest::Snapshot, "snapshot")?;
        response.snapshot.ok_or_else(|| CoreError::SessionProtocol {
            command: "snapshot".into(),
            detail: "no snapshot in response".into(),
        })
    }

    fn navigate(&mut self, url: &str) -> Result<(), CoreError> {
        let request = BridgeRequest::Navigate {
            url: url.to_string(),
        };
        self.send_ok(&request, "navigate")?;
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Best-effort cleanup
        let _ = self.quit();
    }
}
