//! Device and parameter documents.
//!
//! A `Device` is one hardware unit the server can address: its MIDI channel
//! and the named parameters it exposes over Control Change. Documents are
//! plain serde JSON so they can live on disk next to the factory seed.
//! Deserialization alone does not enforce ranges; `validate` runs whenever a
//! document enters the catalog.

pub mod factory;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::midi::DATA_MAX;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("device id is empty")]
    EmptyId,
    #[error("device '{id}': control channel {channel} out of range (1-16)")]
    InvalidChannel { id: String, channel: u8 },
    #[error("device '{id}': parameter name is empty")]
    EmptyParameterName { id: String },
    #[error("device '{id}': parameter '{name}' control number {control} out of range (0-127)")]
    InvalidControl { id: String, name: String, control: u8 },
    #[error("device '{id}': parameter '{name}' range {min}-{max} is invalid")]
    InvalidRange { id: String, name: String, min: u8, max: u8 },
}

/// One controllable parameter on a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub control_number: u8,
    pub min_value: u8,
    pub max_value: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Parameter {
    /// Clamp a requested value into this parameter's declared range.
    ///
    /// Silent: an out-of-range request comes back clamped, never rejected.
    /// Protocol-level limits are enforced separately at message
    /// construction.
    pub fn clamp(&self, value: u8) -> u8 {
        value.clamp(self.min_value, self.max_value)
    }
}

/// One addressable hardware unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub manufacturer: String,
    pub model_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub control_channel: u8,
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Device {
    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.id.is_empty() {
            return Err(DeviceError::EmptyId);
        }
        if !(1..=16).contains(&self.control_channel) {
            return Err(DeviceError::InvalidChannel {
                id: self.id.clone(),
                channel: self.control_channel,
            });
        }
        for param in &self.parameters {
            if param.name.is_empty() {
                return Err(DeviceError::EmptyParameterName { id: self.id.clone() });
            }
            if param.control_number > DATA_MAX {
                return Err(DeviceError::InvalidControl {
                    id: self.id.clone(),
                    name: param.name.clone(),
                    control: param.control_number,
                });
            }
            if param.min_value > param.max_value || param.max_value > DATA_MAX {
                return Err(DeviceError::InvalidRange {
                    id: self.id.clone(),
                    name: param.name.clone(),
                    min: param.min_value,
                    max: param.max_value,
                });
            }
        }
        Ok(())
    }

    /// Case-insensitive parameter lookup; first match wins on ambiguity.
    pub fn parameter_named(&self, name: &str) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn parameter_for_control(&self, control: u8) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.control_number == control)
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }
}
