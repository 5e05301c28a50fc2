//! Device catalog.
//!
//! Every device the server can address, keyed by id. Seeded from the factory
//! list; optionally backed by a directory of one-JSON-document-per-device
//! files loaded in full at startup and rewritten on upsert.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::device::{factory, Device};

pub struct DeviceCatalog {
    devices: BTreeMap<String, Device>,
    backing_dir: Option<PathBuf>,
}

impl DeviceCatalog {
    /// Catalog holding only the factory seed, no backing directory.
    pub fn new() -> Self {
        let mut devices = BTreeMap::new();
        for device in factory::factory_devices() {
            devices.insert(device.id.clone(), device);
        }
        Self {
            devices,
            backing_dir: None,
        }
    }

    /// Attach a directory of device documents. Every readable, valid `*.json`
    /// in it is upserted over the factory seed; bad documents are logged and
    /// skipped so one stray file cannot take the server down. Later upserts
    /// write back into this directory.
    pub fn attach_dir(&mut self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let read_dir = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read {}", dir.display()))?;
        let mut paths: Vec<PathBuf> = read_dir
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .map(|e| e.eq_ignore_ascii_case("json"))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        for path in paths {
            match load_device(&path) {
                Ok(device) => {
                    self.devices.insert(device.id.clone(), device);
                }
                Err(e) => {
                    warn!("Skipping device document {}: {:#}", path.display(), e);
                }
            }
        }
        self.backing_dir = Some(dir.to_path_buf());
        Ok(())
    }

    /// Whole-document add or replace. While a directory is attached the
    /// document is also written through as `<id>.json`.
    pub fn upsert(&mut self, device: Device) -> Result<()> {
        device.validate()?;
        if let Some(dir) = &self.backing_dir {
            save_device(&device, &dir.join(format!("{}.json", device.id)))?;
        }
        self.devices.insert(device.id.clone(), device);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Device> {
        self.devices.get(id)
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl Default for DeviceCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn load_device(path: &Path) -> Result<Device> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let device: Device = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    device.validate()?;
    Ok(device)
}

fn save_device(device: &Device, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(device).context("Failed to serialize device")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
