//! Message transport.
//!
//! `DeviceExecutor` is the seam between the tool layer and whatever carries
//! the bytes. Nothing escapes it: every failure folds into the returned
//! `ExecutionResult`, so a dead cable degrades one response instead of the
//! server.

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use midir::{MidiOutput, MidiOutputConnection};
use tracing::{info, warn};

use crate::midi::{ControlChangeMessage, MidiMessage};

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Outcome of one transmission attempt.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub success: bool,
    pub message: String,
    /// The message this result is about; absent when construction already
    /// failed and nothing reached the transport.
    pub sent: Option<MidiMessage>,
    pub timestamp: u64,
    pub bytes_transmitted: Option<usize>,
}

impl ExecutionResult {
    pub fn ok(message: MidiMessage, detail: impl Into<String>) -> Self {
        let bytes = message.to_bytes().len();
        Self {
            success: true,
            message: detail.into(),
            sent: Some(message),
            timestamp: now_ms(),
            bytes_transmitted: Some(bytes),
        }
    }

    pub fn failed(message: MidiMessage, detail: impl Into<String>) -> Self {
        Self {
            success: false,
            message: detail.into(),
            sent: Some(message),
            timestamp: now_ms(),
            bytes_transmitted: None,
        }
    }

    /// A message that never existed: construction failed before transport.
    pub fn rejected(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            message: detail.into(),
            sent: None,
            timestamp: now_ms(),
            bytes_transmitted: None,
        }
    }
}

pub trait DeviceExecutor {
    fn execute(&mut self, message: MidiMessage) -> ExecutionResult;

    /// Execute a batch in caller order, one result per message. A failure
    /// mid-sequence neither halts nor rolls back the remainder.
    fn execute_many(&mut self, messages: Vec<ControlChangeMessage>) -> Vec<ExecutionResult> {
        messages
            .into_iter()
            .map(|message| self.execute(MidiMessage::ControlChange(message)))
            .collect()
    }
}

/// Real transport over a midir output connection.
///
/// Without a connection the executor still reports success ("logged only"),
/// which keeps the tool surface usable on machines with no MIDI interface.
pub struct MidiExecutor {
    connection: Option<MidiOutputConnection>,
    port_name: Option<String>,
}

impl MidiExecutor {
    pub fn headless() -> Self {
        Self {
            connection: None,
            port_name: None,
        }
    }

    /// Open the first output port whose name contains `port_name`.
    pub fn connect(port_name: &str) -> Result<Self> {
        let midi_out = MidiOutput::new("pedalwire").context("Failed to create MIDI output")?;
        let ports = midi_out.ports();
        let port = ports
            .iter()
            .find(|p| {
                midi_out
                    .port_name(p)
                    .map(|n| n.contains(port_name))
                    .unwrap_or(false)
            })
            .with_context(|| format!("MIDI output port '{}' not found", port_name))?;
        let resolved = midi_out
            .port_name(port)
            .unwrap_or_else(|_| port_name.to_string());
        let connection = midi_out
            .connect(port, "pedalwire-out")
            .map_err(|e| anyhow!("Failed to open MIDI port '{}': {}", resolved, e))?;
        info!("Connected to MIDI output '{}'", resolved);
        Ok(Self {
            connection: Some(connection),
            port_name: Some(resolved),
        })
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }
}

impl DeviceExecutor for MidiExecutor {
    fn execute(&mut self, message: MidiMessage) -> ExecutionResult {
        let bytes = message.to_bytes();
        match &mut self.connection {
            Some(conn) => match conn.send(&bytes) {
                Ok(()) => ExecutionResult::ok(message, format!("sent {} bytes", bytes.len())),
                Err(e) => {
                    warn!("MIDI send failed: {}", e);
                    ExecutionResult::failed(message, format!("MIDI send failed: {}", e))
                }
            },
            None => ExecutionResult::ok(message, "no MIDI output attached, logged only"),
        }
    }
}

/// In-memory fake that records what would have gone out on the wire.
#[derive(Default)]
pub struct RecordingExecutor {
    pub sent: Vec<MidiMessage>,
    pub fail_sends: bool,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder whose every send fails, for exercising transport-failure
    /// paths.
    pub fn failing() -> Self {
        Self {
            sent: Vec::new(),
            fail_sends: true,
        }
    }
}

impl DeviceExecutor for RecordingExecutor {
    fn execute(&mut self, message: MidiMessage) -> ExecutionResult {
        if self.fail_sends {
            return ExecutionResult::failed(message, "transport down");
        }
        let result = ExecutionResult::ok(message.clone(), format!("recorded {} bytes", message.to_bytes().len()));
        self.sent.push(message);
        result
    }
}
