use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};
use tracing::debug;

use crate::catalog::DeviceCatalog;
use crate::device::Device;
use crate::executor::{DeviceExecutor, ExecutionResult};
use crate::midi::{ControlChangeMessage, MidiMessage, ProgramChangeMessage};
use crate::preset::{ComposedPreset, ComposerRegistry};
use crate::suggest;

/// MCP tool handler for pedalwire.
///
/// Owns the catalog, the preset layouts, and the transport. Every handler
/// returns `Result<Value>`; the stdio layer turns an `Err` into a JSON-RPC
/// error object, so a failed lookup costs one response, never the process.
pub struct PedalwireMcp<E: DeviceExecutor> {
    catalog: DeviceCatalog,
    composers: ComposerRegistry,
    executor: E,
}

fn require_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .ok_or_else(|| anyhow!("Missing required argument: {}", key))?
        .as_str()
        .ok_or_else(|| anyhow!("Argument '{}' must be a string", key))
}

fn require_u8(args: &Value, key: &str) -> Result<u8> {
    let n = args
        .get(key)
        .ok_or_else(|| anyhow!("Missing required argument: {}", key))?
        .as_u64()
        .ok_or_else(|| anyhow!("Argument '{}' must be a non-negative integer", key))?;
    u8::try_from(n).map_err(|_| anyhow!("Argument '{}' value {} does not fit in a MIDI byte", key, n))
}

/// One tool-path value resolved against the catalog, clamped into the
/// parameter's declared range.
struct ResolvedControl {
    channel: u8,
    control: u8,
    name: String,
    requested: u8,
    value: u8,
}

impl ResolvedControl {
    fn clamped(&self) -> bool {
        self.requested != self.value
    }
}

fn decode_change(entry: &Value) -> Result<(u8, u8)> {
    Ok((require_u8(entry, "control")?, require_u8(entry, "value")?))
}

fn execution_json(result: &ExecutionResult) -> Value {
    json!({
        "success": result.success,
        "message": result.message,
        "kind": result.sent.as_ref().map(|m| m.kind()),
        "bytes": result.sent.as_ref().map(|m| m.hex_string()),
        "bytes_transmitted": result.bytes_transmitted,
        "timestamp": result.timestamp,
    })
}

impl<E: DeviceExecutor> PedalwireMcp<E> {
    pub fn new(catalog: DeviceCatalog, composers: ComposerRegistry, executor: E) -> Self {
        Self {
            catalog,
            composers,
            executor,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    fn device(&self, device_id: &str) -> Result<&Device> {
        self.catalog
            .get(device_id)
            .ok_or_else(|| anyhow!("Unknown device: {}", device_id))
    }

    fn resolve_control(&self, device_id: &str, parameter: &str, value: u8) -> Result<ResolvedControl> {
        let device = self.device(device_id)?;
        let param = device.parameter_named(parameter).ok_or_else(|| {
            anyhow!(
                "Unknown parameter '{}' on device '{}' (has: {})",
                parameter,
                device_id,
                device.parameter_names().join(", ")
            )
        })?;
        Ok(ResolvedControl {
            channel: device.control_channel,
            control: param.control_number,
            name: param.name.clone(),
            requested: value,
            value: param.clamp(value),
        })
    }

    /// Resolve named parameter values against the catalog and pack them into
    /// the device's preset frame. Returns the frame plus the names of any
    /// clamped parameters and of parameters whose controls have no slot in
    /// the frame.
    fn compose_for(
        &self,
        device_id: &str,
        name: &str,
        values: &Value,
    ) -> Result<(ComposedPreset, Vec<String>, Vec<String>)> {
        let device = self.device(device_id)?;
        let layout = self.composers.get(device_id).ok_or_else(|| {
            anyhow!(
                "Device '{}' has no preset layout (sysex families: {})",
                device_id,
                self.composers.device_ids().join(", ")
            )
        })?;

        let entries = values
            .as_object()
            .ok_or_else(|| anyhow!("Argument 'values' must be an object of parameter values"))?;

        let mut by_control: BTreeMap<u8, u8> = BTreeMap::new();
        let mut clamped = Vec::new();
        for (pname, v) in entries {
            let requested = v
                .as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| anyhow!("Value for '{}' must be an integer 0-255", pname))?;
            let resolved = self.resolve_control(device_id, pname, requested)?;
            if resolved.clamped() {
                clamped.push(resolved.name.clone());
            }
            by_control.insert(resolved.control, resolved.value);
        }

        let composed = layout.compose(&by_control, name)?;
        let skipped = composed
            .skipped_controls
            .iter()
            .filter_map(|cc| device.parameter_for_control(*cc))
            .map(|p| p.name.clone())
            .collect();
        Ok((composed, clamped, skipped))
    }

    // === Catalog Tools ===

    /// Add or replace a whole device document
    pub fn add_device(&mut self, args: &Value) -> Result<Value> {
        let document = args
            .get("device")
            .ok_or_else(|| anyhow!("Missing required argument: device"))?;
        let device: Device =
            serde_json::from_value(document.clone()).context("Invalid device document")?;
        let device_id = device.id.clone();
        let parameter_count = device.parameters.len();
        self.catalog.upsert(device)?;
        Ok(json!({
            "status": "ok",
            "device_id": device_id,
            "parameter_count": parameter_count,
        }))
    }

    /// Fetch one device document by id
    pub fn get_device(&self, device_id: &str) -> Result<Value> {
        let device = self.device(device_id)?;
        let mut document = serde_json::to_value(device).context("Failed to serialize device")?;
        document["has_preset_layout"] = json!(self.composers.get(device_id).is_some());
        Ok(document)
    }

    /// Summary list of the catalog
    pub fn list_devices(&self) -> Result<Value> {
        let devices: Vec<Value> = self
            .catalog
            .devices()
            .map(|d| {
                json!({
                    "id": d.id,
                    "manufacturer": d.manufacturer,
                    "model_name": d.model_name,
                    "channel": d.control_channel,
                    "parameter_count": d.parameters.len(),
                    "has_preset_layout": self.composers.get(&d.id).is_some(),
                })
            })
            .collect();
        Ok(json!({ "devices": devices, "count": self.catalog.len() }))
    }

    // === Control Change Tools ===

    /// Resolve and encode without transmitting
    pub fn generate_control_change(&self, device_id: &str, parameter: &str, value: u8) -> Result<Value> {
        let resolved = self.resolve_control(device_id, parameter, value)?;
        let message = ControlChangeMessage::new(resolved.channel, resolved.control, resolved.value)?;
        Ok(json!({
            "status": "ok",
            "device_id": device_id,
            "parameter": resolved.name,
            "control": resolved.control,
            "channel": resolved.channel,
            "requested_value": resolved.requested,
            "value": resolved.value,
            "clamped": resolved.clamped(),
            "bytes": MidiMessage::from(message).hex_string(),
            "transmitted": false,
        }))
    }

    /// Resolve, encode, and transmit
    pub fn set_parameter(&mut self, device_id: &str, parameter: &str, value: u8) -> Result<Value> {
        let resolved = self.resolve_control(device_id, parameter, value)?;
        let message = ControlChangeMessage::new(resolved.channel, resolved.control, resolved.value)?;
        let result = self.executor.execute(message.into());
        Ok(json!({
            "status": if result.success { "ok" } else { "error" },
            "device_id": device_id,
            "parameter": resolved.name,
            "value": resolved.value,
            "clamped": resolved.clamped(),
            "execution": execution_json(&result),
        }))
    }

    /// Raw controller batch on the device's channel. Entries are independent:
    /// one failing construction is reported in place and never reaches the
    /// transport, while its neighbours still go out in caller order.
    pub fn send_control_changes(&mut self, device_id: &str, changes: &Value) -> Result<Value> {
        let channel = self.device(device_id)?.control_channel;
        let entries = changes
            .as_array()
            .ok_or_else(|| anyhow!("Argument 'changes' must be an array"))?;

        let mut results = Vec::new();
        for entry in entries {
            let message = decode_change(entry).and_then(|(control, value)| {
                ControlChangeMessage::new(channel, control, value).map_err(Into::into)
            });
            let result = match message {
                Ok(m) => self.executor.execute(m.into()),
                Err(e) => ExecutionResult::rejected(format!("{:#}", e)),
            };
            results.push(result);
        }

        let sent = results.iter().filter(|r| r.success).count();
        Ok(json!({
            "status": if sent == results.len() { "ok" } else { "partial" },
            "device_id": device_id,
            "channel": channel,
            "sent": sent,
            "failed": results.len() - sent,
            "results": results.iter().map(execution_json).collect::<Vec<_>>(),
        }))
    }

    /// Program select on the device's channel
    pub fn send_program_change(&mut self, device_id: &str, program: u8) -> Result<Value> {
        let channel = self.device(device_id)?.control_channel;
        let message = ProgramChangeMessage::new(channel, program)?;
        let result = self.executor.execute(message.into());
        Ok(json!({
            "status": if result.success { "ok" } else { "error" },
            "device_id": device_id,
            "program": program,
            "channel": channel,
            "execution": execution_json(&result),
        }))
    }

    // === Preset Tools ===

    /// Build a preset frame without transmitting
    pub fn compose_preset(&self, device_id: &str, name: &str, values: &Value) -> Result<Value> {
        let (composed, clamped, skipped) = self.compose_for(device_id, name, values)?;
        let frame_length = composed.sysex.len();
        let skipped_controls = composed.skipped_controls;
        let bytes = MidiMessage::Sysex(composed.sysex).hex_string();
        Ok(json!({
            "status": "ok",
            "device_id": device_id,
            "name": name,
            "frame_length": frame_length,
            "bytes": bytes,
            "skipped_controls": skipped_controls,
            "skipped_parameters": skipped,
            "clamped_parameters": clamped,
            "transmitted": false,
        }))
    }

    /// Build a preset frame and transmit it
    pub fn send_preset(&mut self, device_id: &str, name: &str, values: &Value) -> Result<Value> {
        let (composed, clamped, skipped) = self.compose_for(device_id, name, values)?;
        let skipped_controls = composed.skipped_controls;
        let result = self.executor.execute(MidiMessage::Sysex(composed.sysex));
        Ok(json!({
            "status": if result.success { "ok" } else { "error" },
            "device_id": device_id,
            "name": name,
            "skipped_controls": skipped_controls,
            "skipped_parameters": skipped,
            "clamped_parameters": clamped,
            "execution": execution_json(&result),
        }))
    }

    // === Suggestion Tools ===

    /// Map a free-text sound request to parameter nudges
    pub fn suggest_parameters(&self, device_id: &str, request: &str) -> Result<Value> {
        let device = self.device(device_id)?;
        match suggest::suggest(request, device) {
            Some(set) => {
                let suggestions: Vec<Value> = set
                    .nudges
                    .iter()
                    .map(|n| {
                        json!({
                            "parameter": n.parameter,
                            "direction": n.direction.as_str(),
                            "target": n.target,
                            "reason": n.reason,
                        })
                    })
                    .collect();
                Ok(json!({
                    "status": "ok",
                    "device_id": device_id,
                    "matched": set.matched_keyword,
                    "suggestions": suggestions,
                }))
            }
            None => Ok(json!({
                "status": "ok",
                "device_id": device_id,
                "matched": null,
                "message": "No rule matched this request; adjust one of the device's parameters directly",
                "parameters": device.parameter_names(),
            })),
        }
    }

    pub fn handle_tool_call(&mut self, tool: &str, args: &Value) -> Result<Value> {
        debug!("tool call: {}", tool);
        match tool {
            // Catalog
            "add_device" => self.add_device(args),
            "get_device" => {
                let device_id = require_str(args, "device_id")?;
                self.get_device(device_id)
            }
            "list_devices" => self.list_devices(),

            // Control changes
            "generate_control_change" => {
                let device_id = require_str(args, "device_id")?;
                let parameter = require_str(args, "parameter")?;
                let value = require_u8(args, "value")?;
                self.generate_control_change(device_id, parameter, value)
            }
            "set_parameter" => {
                let device_id = require_str(args, "device_id")?;
                let parameter = require_str(args, "parameter")?;
                let value = require_u8(args, "value")?;
                self.set_parameter(device_id, parameter, value)
            }
            "send_control_changes" => {
                let device_id = require_str(args, "device_id")?;
                let changes = args
                    .get("changes")
                    .ok_or_else(|| anyhow!("Missing required argument: changes"))?;
                self.send_control_changes(device_id, changes)
            }
            "send_program_change" => {
                let device_id = require_str(args, "device_id")?;
                let program = require_u8(args, "program")?;
                self.send_program_change(device_id, program)
            }

            // Presets
            "compose_preset" => {
                let device_id = require_str(args, "device_id")?;
                let name = require_str(args, "name")?;
                let values = args.get("values").cloned().unwrap_or_else(|| json!({}));
                self.compose_preset(device_id, name, &values)
            }
            "send_preset" => {
                let device_id = require_str(args, "device_id")?;
                let name = require_str(args, "name")?;
                let values = args.get("values").cloned().unwrap_or_else(|| json!({}));
                self.send_preset(device_id, name, &values)
            }

            // Suggestions
            "suggest_parameters" => {
                let device_id = require_str(args, "device_id")?;
                let request = require_str(args, "request")?;
                self.suggest_parameters(device_id, request)
            }

            _ => Err(anyhow!("Unknown tool: {}", tool)),
        }
    }
}

pub fn list_tools() -> Value {
    json!({
        "tools": [
            {
                "name": "add_device",
                "description": "Add a device to the catalog, or replace it wholesale if the id already exists. The document is persisted when a devices directory is attached.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "device": {
                            "type": "object",
                            "description": "Full device document: id, manufacturer, model_name, control_channel (1-16), parameters (name, control_number, min_value, max_value)"
                        }
                    },
                    "required": ["device"]
                }
            },
            {
                "name": "get_device",
                "description": "Fetch one device document by id, including its full parameter table.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "device_id": {
                            "type": "string",
                            "description": "Device id, e.g. meris_lvx"
                        }
                    },
                    "required": ["device_id"]
                }
            },
            {
                "name": "list_devices",
                "description": "List every device in the catalog with channel and parameter count.",
                "inputSchema": {
                    "type": "object",
                    "properties": {}
                }
            },
            {
                "name": "generate_control_change",
                "description": "Resolve a named parameter and encode a Control Change without sending it. Values outside the parameter's declared range are clamped. Returns the raw bytes as hex.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "device_id": {
                            "type": "string",
                            "description": "Device id"
                        },
                        "parameter": {
                            "type": "string",
                            "description": "Parameter name (case-insensitive)"
                        },
                        "value": {
                            "type": "integer",
                            "description": "Requested value; clamped into the parameter's declared range"
                        }
                    },
                    "required": ["device_id", "parameter", "value"]
                }
            },
            {
                "name": "set_parameter",
                "description": "Resolve a named parameter, encode a Control Change, and send it to the device.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "device_id": {
                            "type": "string",
                            "description": "Device id"
                        },
                        "parameter": {
                            "type": "string",
                            "description": "Parameter name (case-insensitive)"
                        },
                        "value": {
                            "type": "integer",
                            "description": "Requested value; clamped into the parameter's declared range"
                        }
                    },
                    "required": ["device_id", "parameter", "value"]
                }
            },
            {
                "name": "send_control_changes",
                "description": "Send a batch of raw controller/value pairs on the device's channel, in order. Each entry succeeds or fails on its own; an invalid entry never reaches the wire and does not stop the rest.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "device_id": {
                            "type": "string",
                            "description": "Device id"
                        },
                        "changes": {
                            "type": "array",
                            "description": "Controller/value pairs, executed in order",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "control": {
                                        "type": "integer",
                                        "description": "Controller number (0-127)"
                                    },
                                    "value": {
                                        "type": "integer",
                                        "description": "Controller value (0-127)"
                                    }
                                },
                                "required": ["control", "value"]
                            }
                        }
                    },
                    "required": ["device_id", "changes"]
                }
            },
            {
                "name": "send_program_change",
                "description": "Send a Program Change (preset select) on the device's channel.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "device_id": {
                            "type": "string",
                            "description": "Device id"
                        },
                        "program": {
                            "type": "integer",
                            "description": "Program number (0-127)"
                        }
                    },
                    "required": ["device_id", "program"]
                }
            },
            {
                "name": "compose_preset",
                "description": "Build a full SysEx preset frame for a device from named parameter values and a preset name, without sending it. Parameters with no slot in the frame are reported as skipped. Returns the frame as hex.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "device_id": {
                            "type": "string",
                            "description": "Device id (must have a preset layout)"
                        },
                        "name": {
                            "type": "string",
                            "description": "Preset name; truncated to the device's name field"
                        },
                        "values": {
                            "type": "object",
                            "description": "Parameter name to value map; unspecified parameters keep factory defaults",
                            "additionalProperties": { "type": "integer" }
                        }
                    },
                    "required": ["device_id", "name"]
                }
            },
            {
                "name": "send_preset",
                "description": "Build a full SysEx preset frame and send it to the device.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "device_id": {
                            "type": "string",
                            "description": "Device id (must have a preset layout)"
                        },
                        "name": {
                            "type": "string",
                            "description": "Preset name; truncated to the device's name field"
                        },
                        "values": {
                            "type": "object",
                            "description": "Parameter name to value map; unspecified parameters keep factory defaults",
                            "additionalProperties": { "type": "integer" }
                        }
                    },
                    "required": ["device_id", "name"]
                }
            },
            {
                "name": "suggest_parameters",
                "description": "Interpret a free-text sound request ('brighter', 'more ambient') as parameter nudges for a device. A fixed keyword table, not a model; falls back to listing the device's parameters.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "device_id": {
                            "type": "string",
                            "description": "Device id"
                        },
                        "request": {
                            "type": "string",
                            "description": "Sound description, e.g. 'warmer with a longer tail'"
                        }
                    },
                    "required": ["device_id", "request"]
                }
            }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::RecordingExecutor;

    fn server() -> PedalwireMcp<RecordingExecutor> {
        PedalwireMcp::new(
            DeviceCatalog::new(),
            ComposerRegistry::factory(),
            RecordingExecutor::new(),
        )
    }

    fn hex_to_bytes(hex: &str) -> Vec<u8> {
        hex.split_whitespace()
            .map(|b| u8::from_str_radix(b, 16).unwrap())
            .collect()
    }

    #[test]
    fn test_generate_control_change_encodes_without_sending() {
        let mut mcp = server();
        let result = mcp
            .handle_tool_call(
                "generate_control_change",
                &json!({ "device_id": "meris_lvx", "parameter": "Filter", "value": 100 }),
            )
            .unwrap();
        assert_eq!(result["bytes"], "B0 05 64");
        assert_eq!(result["clamped"], false);
        assert_eq!(result["transmitted"], false);
        assert!(mcp.executor().sent.is_empty());
    }

    #[test]
    fn test_parameter_lookup_is_case_insensitive() {
        let mut mcp = server();
        let result = mcp
            .handle_tool_call(
                "generate_control_change",
                &json!({ "device_id": "meris_lvx", "parameter": "filter", "value": 1 }),
            )
            .unwrap();
        assert_eq!(result["parameter"], "Filter");
    }

    #[test]
    fn test_set_parameter_clamps_and_sends() {
        let mut mcp = server();
        let result = mcp
            .handle_tool_call(
                "set_parameter",
                &json!({ "device_id": "meris_mercury7", "parameter": "Algorithm", "value": 100 }),
            )
            .unwrap();
        assert_eq!(result["status"], "ok");
        assert_eq!(result["value"], 1);
        assert_eq!(result["clamped"], true);
        // Mercury7 listens on channel 2
        assert_eq!(mcp.executor().sent.len(), 1);
        assert_eq!(mcp.executor().sent[0].to_bytes(), vec![0xB1, 26, 1]);
    }

    #[test]
    fn test_unknown_device_is_an_error() {
        let mut mcp = server();
        let err = mcp
            .handle_tool_call(
                "set_parameter",
                &json!({ "device_id": "boss_dd3", "parameter": "Mix", "value": 1 }),
            )
            .unwrap_err();
        assert!(err.to_string().contains("Unknown device"));
        assert!(mcp.executor().sent.is_empty());
    }

    #[test]
    fn test_unknown_parameter_lists_alternatives() {
        let mut mcp = server();
        let err = mcp
            .handle_tool_call(
                "generate_control_change",
                &json!({ "device_id": "meris_lvx", "parameter": "Reverb", "value": 1 }),
            )
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("Unknown parameter"));
        assert!(text.contains("Filter"));
    }

    #[test]
    fn test_missing_argument_is_an_error() {
        let mut mcp = server();
        let err = mcp
            .handle_tool_call("get_device", &json!({}))
            .unwrap_err();
        assert!(err.to_string().contains("Missing required argument"));
    }

    #[test]
    fn test_unknown_tool_is_an_error() {
        let mut mcp = server();
        let err = mcp.handle_tool_call("reticulate", &json!({})).unwrap_err();
        assert!(err.to_string().contains("Unknown tool"));
    }

    #[test]
    fn test_batch_entries_fail_independently() {
        let mut mcp = server();
        let result = mcp
            .handle_tool_call(
                "send_control_changes",
                &json!({
                    "device_id": "meris_lvx",
                    "changes": [
                        { "control": 7, "value": 100 },
                        { "control": 200, "value": 50 },
                        { "control": 8, "value": 25 }
                    ]
                }),
            )
            .unwrap();

        assert_eq!(result["status"], "partial");
        assert_eq!(result["sent"], 2);
        assert_eq!(result["failed"], 1);
        let results = result["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0]["success"], true);
        assert_eq!(results[1]["success"], false);
        assert_eq!(results[2]["success"], true);

        // The malformed entry never reached the transport
        let sent: Vec<Vec<u8>> = mcp.executor().sent.iter().map(|m| m.to_bytes()).collect();
        assert_eq!(sent, vec![vec![0xB0, 7, 100], vec![0xB0, 8, 25]]);
    }

    #[test]
    fn test_batch_entry_missing_key_is_rejected_in_place() {
        let mut mcp = server();
        let result = mcp
            .handle_tool_call(
                "send_control_changes",
                &json!({
                    "device_id": "meris_lvx",
                    "changes": [ { "control": 7 } ]
                }),
            )
            .unwrap();
        assert_eq!(result["sent"], 0);
        assert_eq!(result["results"][0]["success"], false);
        assert!(mcp.executor().sent.is_empty());
    }

    #[test]
    fn test_compose_preset_matches_frame_layout() {
        let mut mcp = server();
        let result = mcp
            .handle_tool_call(
                "compose_preset",
                &json!({
                    "device_id": "meris_mercury7",
                    "name": "CONNECTIVITY_TEST",
                    "values": {
                        "Mix": 100,
                        "Hi Frequency": 25,
                        "Vibrato Depth": 110,
                        "Output Level": 60
                    }
                }),
            )
            .unwrap();

        assert_eq!(result["frame_length"], 231);
        assert_eq!(result["transmitted"], false);
        let frame = hex_to_bytes(result["bytes"].as_str().unwrap());
        assert_eq!(frame.len(), 231);
        assert_eq!(frame[0], 0xF0);
        assert_eq!(frame[9], 0x64);
        assert_eq!(frame[13], 0x19);
        assert_eq!(&frame[212..230], b"CONNECTIVITY_TES\0\0");
        assert_eq!(frame[230], 0xF7);
        assert!(mcp.executor().sent.is_empty());
    }

    #[test]
    fn test_compose_preset_reports_skipped_controls() {
        let mut mcp = server();
        // Bypass exists on the Mercury7 but has no slot in the frame
        let result = mcp
            .handle_tool_call(
                "compose_preset",
                &json!({
                    "device_id": "meris_mercury7",
                    "name": "SKIP",
                    "values": { "Bypass": 127 }
                }),
            )
            .unwrap();
        assert_eq!(result["skipped_controls"], json!([14]));
        assert_eq!(result["skipped_parameters"], json!(["Bypass"]));
    }

    #[test]
    fn test_compose_preset_requires_a_layout() {
        let mut mcp = server();
        let err = mcp
            .handle_tool_call(
                "compose_preset",
                &json!({ "device_id": "meris_lvx", "name": "NOPE", "values": {} }),
            )
            .unwrap_err();
        assert!(err.to_string().contains("no preset layout"));
    }

    #[test]
    fn test_send_preset_transmits_whole_frame() {
        let mut mcp = server();
        let result = mcp
            .handle_tool_call(
                "send_preset",
                &json!({ "device_id": "meris_enzo", "name": "LEADS", "values": { "Sustain": 90 } }),
            )
            .unwrap();
        assert_eq!(result["status"], "ok");
        assert_eq!(result["execution"]["bytes_transmitted"], 231);
        assert_eq!(mcp.executor().sent.len(), 1);
        assert_eq!(mcp.executor().sent[0].to_bytes().len(), 231);
    }

    #[test]
    fn test_send_program_change() {
        let mut mcp = server();
        let result = mcp
            .handle_tool_call(
                "send_program_change",
                &json!({ "device_id": "meris_polymoon", "program": 5 }),
            )
            .unwrap();
        assert_eq!(result["status"], "ok");
        // Polymoon listens on channel 3
        assert_eq!(mcp.executor().sent[0].to_bytes(), vec![0xC2, 5]);
    }

    #[test]
    fn test_add_then_get_device() {
        let mut mcp = server();
        let result = mcp
            .handle_tool_call(
                "add_device",
                &json!({
                    "device": {
                        "id": "strymon_timeline",
                        "manufacturer": "Strymon",
                        "model_name": "Timeline",
                        "control_channel": 5,
                        "parameters": [
                            { "name": "Mix", "control_number": 13, "min_value": 0, "max_value": 127 }
                        ]
                    }
                }),
            )
            .unwrap();
        assert_eq!(result["status"], "ok");
        assert_eq!(result["parameter_count"], 1);

        let fetched = mcp
            .handle_tool_call("get_device", &json!({ "device_id": "strymon_timeline" }))
            .unwrap();
        assert_eq!(fetched["control_channel"], 5);
        assert_eq!(fetched["has_preset_layout"], false);

        let listed = mcp.handle_tool_call("list_devices", &json!({})).unwrap();
        assert_eq!(listed["count"], 5);
    }

    #[test]
    fn test_add_device_rejects_invalid_document() {
        let mut mcp = server();
        let err = mcp
            .handle_tool_call(
                "add_device",
                &json!({
                    "device": {
                        "id": "bad",
                        "manufacturer": "X",
                        "model_name": "Y",
                        "control_channel": 0,
                        "parameters": []
                    }
                }),
            )
            .unwrap_err();
        assert!(err.to_string().contains("control channel"));
    }

    #[test]
    fn test_suggest_parameters_round_trip() {
        let mut mcp = server();
        let result = mcp
            .handle_tool_call(
                "suggest_parameters",
                &json!({ "device_id": "meris_lvx", "request": "make it brighter" }),
            )
            .unwrap();
        assert_eq!(result["matched"], "bright");
        assert_eq!(result["suggestions"][0]["parameter"], "Filter");

        let fallback = mcp
            .handle_tool_call(
                "suggest_parameters",
                &json!({ "device_id": "meris_lvx", "request": "sound like mars" }),
            )
            .unwrap();
        assert_eq!(fallback["matched"], Value::Null);
        assert!(fallback["parameters"].as_array().unwrap().len() > 5);
    }

    #[test]
    fn test_transport_failure_stays_in_result() {
        let mut mcp = PedalwireMcp::new(
            DeviceCatalog::new(),
            ComposerRegistry::factory(),
            RecordingExecutor::failing(),
        );
        let result = mcp
            .handle_tool_call(
                "set_parameter",
                &json!({ "device_id": "meris_lvx", "parameter": "Mix", "value": 64 }),
            )
            .unwrap();
        assert_eq!(result["status"], "error");
        assert_eq!(result["execution"]["success"], false);
    }

    #[test]
    fn test_list_tools_catalog() {
        let tools = list_tools();
        let entries = tools["tools"].as_array().unwrap();
        assert_eq!(entries.len(), 10);
        for entry in entries {
            assert!(entry["name"].is_string());
            assert!(entry["inputSchema"]["type"] == "object");
        }
    }
}
