//! SysEx preset composition.
//!
//! Each supported family's preset memory is a fixed-width binary record
//! reverse-derived from factory dumps; there is no general schema. A
//! `PresetLayout` carries one family's frame constants and the compose
//! algorithm shared by all of them: zero-fill, bracket and header, default
//! bytes, parameter bytes in ascending controller order, name field,
//! terminator. Families differ only in data.
//!
//! The LVX has no SysEx-addressable preset memory and so has no layout here.

pub mod enzo;
pub mod mercury7;
pub mod polymoon;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::midi::{MidiError, SysexMessage, DATA_MAX, SYSEX_END, SYSEX_START};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComposeError {
    #[error("value {value} for controller {control} out of range (0-127)")]
    ValueOutOfRange { control: u8, value: u8 },
    #[error(transparent)]
    Midi(#[from] MidiError),
}

/// Frame constants for one device family.
#[derive(Debug, Clone)]
pub struct PresetLayout {
    pub device_id: String,
    /// Seven bytes following the F0, identifying manufacturer and model.
    pub header: [u8; 7],
    pub frame_len: usize,
    pub name_offset: usize,
    pub name_len: usize,
    /// Controller number to frame offset. Controllers absent here are
    /// CC-only and get skipped by `compose`.
    pub offsets: BTreeMap<u8, usize>,
    /// Bytes written before any parameter, so an unspecified parameter
    /// still yields a usable preset instead of all zeros.
    pub defaults: Vec<(usize, u8)>,
}

/// A finished frame plus the controllers that had no slot in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPreset {
    pub sysex: SysexMessage,
    pub skipped_controls: Vec<u8>,
}

impl PresetLayout {
    /// Build a complete preset frame from controller values and a name.
    ///
    /// Values must sit in the 7-bit protocol range; clamping into a
    /// parameter's narrower declared range is the caller's business and has
    /// already happened by the time values reach this layer. Controllers
    /// with no slot in the frame are recorded, not rejected.
    pub fn compose(
        &self,
        values: &BTreeMap<u8, u8>,
        name: &str,
    ) -> Result<ComposedPreset, ComposeError> {
        let mut frame = vec![0u8; self.frame_len];
        frame[0] = SYSEX_START;
        frame[1..8].copy_from_slice(&self.header);

        for &(offset, byte) in &self.defaults {
            frame[offset] = byte;
        }

        let mut skipped = Vec::new();
        for (&control, &value) in values {
            if value > DATA_MAX {
                return Err(ComposeError::ValueOutOfRange { control, value });
            }
            match self.offsets.get(&control) {
                Some(&offset) => frame[offset] = value & DATA_MAX,
                None => skipped.push(control),
            }
        }

        for byte in &mut frame[self.name_offset..self.name_offset + self.name_len] {
            *byte = 0;
        }
        for (i, byte) in name.bytes().take(self.name_len).enumerate() {
            frame[self.name_offset + i] = byte;
        }

        frame[self.frame_len - 1] = SYSEX_END;

        let sysex = SysexMessage::new(frame)?;
        Ok(ComposedPreset {
            sysex,
            skipped_controls: skipped,
        })
    }
}

/// Immutable set of factory preset layouts, keyed by device id.
pub struct ComposerRegistry {
    layouts: BTreeMap<String, PresetLayout>,
}

impl ComposerRegistry {
    pub fn factory() -> Self {
        let mut layouts = BTreeMap::new();
        for layout in [mercury7::layout(), polymoon::layout(), enzo::layout()] {
            layouts.insert(layout.device_id.clone(), layout);
        }
        Self { layouts }
    }

    pub fn get(&self, device_id: &str) -> Option<&PresetLayout> {
        self.layouts.get(device_id)
    }

    pub fn layouts(&self) -> impl Iterator<Item = &PresetLayout> {
        self.layouts.values()
    }

    pub fn device_ids(&self) -> Vec<&str> {
        self.layouts.keys().map(|k| k.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(u8, u8)]) -> BTreeMap<u8, u8> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_reverb_frame_golden() {
        let layout = mercury7::layout();
        let composed = layout
            .compose(&values(&[(1, 100), (5, 25), (11, 110), (12, 60)]), "CONNECTIVITY_TEST")
            .unwrap();
        let frame = composed.sysex.as_bytes();

        assert_eq!(frame.len(), 231);
        assert_eq!(frame[0], 0xF0);
        assert_eq!(&frame[1..8], &layout.header);
        assert_eq!(frame[9], 0x64);
        assert_eq!(frame[13], 0x19);
        assert_eq!(frame[19], 110);
        assert_eq!(frame[20], 60);
        // Seventeen-character name truncates to the sixteen-byte field;
        // the two bytes before the terminator stay zero
        assert_eq!(&frame[212..230], b"CONNECTIVITY_TES\0\0");
        assert_eq!(frame[230], 0xF7);
        assert!(composed.skipped_controls.is_empty());
    }

    #[test]
    fn test_compose_is_idempotent() {
        let layout = polymoon::layout();
        let input = values(&[(16, 80), (18, 64), (27, 1)]);
        let a = layout.compose(&input, "TAPEWORN").unwrap();
        let b = layout.compose(&input, "TAPEWORN").unwrap();
        assert_eq!(a.sysex, b.sysex);
        assert_eq!(a.skipped_controls, b.skipped_controls);
    }

    #[test]
    fn test_empty_values_yields_default_frame() {
        let layout = enzo::layout();
        let composed = layout.compose(&BTreeMap::new(), "INIT").unwrap();
        let frame = composed.sysex.as_bytes();

        assert_eq!(frame.len(), layout.frame_len);
        assert_eq!(frame[0], 0xF0);
        assert_eq!(frame[layout.frame_len - 1], 0xF7);
        for &(offset, byte) in &layout.defaults {
            assert_eq!(frame[offset], byte, "default at offset {}", offset);
        }
        assert_eq!(&frame[212..216], b"INIT");
        assert!(frame[216..228].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_name_exactly_field_length() {
        let layout = mercury7::layout();
        let composed = layout.compose(&BTreeMap::new(), "SIXTEEN_CHARS_AB").unwrap();
        let frame = composed.sysex.as_bytes();
        assert_eq!(&frame[212..228], b"SIXTEEN_CHARS_AB");
        assert_eq!(frame[228], 0);
        assert_eq!(frame[229], 0);
    }

    #[test]
    fn test_unknown_controls_skipped_without_touching_frame() {
        let layout = mercury7::layout();
        let baseline = layout.compose(&BTreeMap::new(), "SAME").unwrap();
        // Bypass (14) and an unassigned controller have no frame slot
        let composed = layout.compose(&values(&[(14, 127), (99, 1)]), "SAME").unwrap();
        assert_eq!(composed.skipped_controls, vec![14, 99]);
        assert_eq!(composed.sysex, baseline.sysex);
    }

    #[test]
    fn test_eight_bit_value_rejected() {
        let layout = mercury7::layout();
        let err = layout.compose(&values(&[(1, 200)]), "BAD").unwrap_err();
        assert_eq!(
            err,
            ComposeError::ValueOutOfRange {
                control: 1,
                value: 200
            }
        );
    }

    #[test]
    fn test_registry_covers_sysex_families_only() {
        let registry = ComposerRegistry::factory();
        assert_eq!(
            registry.device_ids(),
            vec!["meris_enzo", "meris_mercury7", "meris_polymoon"]
        );
        assert!(registry.get("meris_lvx").is_none());
    }

    #[test]
    fn test_factory_layouts_well_formed() {
        for layout in ComposerRegistry::factory().layouts() {
            assert_eq!(layout.frame_len, 231);
            assert!(layout.name_offset + layout.name_len < layout.frame_len);
            for (&control, &offset) in &layout.offsets {
                assert!(control <= 127);
                // Slots live strictly between the header and the name field
                assert!(
                    (9..layout.name_offset).contains(&offset),
                    "{}: cc {} slot {} collides",
                    layout.device_id,
                    control,
                    offset
                );
            }
            for &(offset, byte) in &layout.defaults {
                assert!((9..layout.name_offset).contains(&offset));
                assert!(byte <= 127);
            }
        }
    }
}
