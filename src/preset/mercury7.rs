//! Mercury7 reverb preset frame.
//!
//! The front-panel block (CC 1-12) packs into offsets 9-20; Swell and the
//! algorithm select sit past it. Offsets and defaults come from factory
//! preset dumps.

use std::collections::BTreeMap;

use super::PresetLayout;

const FRAME_LEN: usize = 231;
const NAME_OFFSET: usize = 212;
const NAME_LEN: usize = 16;
const HEADER: [u8; 7] = [0x00, 0x20, 0x10, 0x00, 0x01, 0x00, 0x26];

pub fn layout() -> PresetLayout {
    let mut offsets = BTreeMap::new();
    // Knob block lands contiguously after the header
    for cc in 1..=12u8 {
        offsets.insert(cc, cc as usize + 8);
    }
    offsets.insert(23, 31); // Swell
    offsets.insert(26, 34); // Algorithm

    PresetLayout {
        device_id: "meris_mercury7".to_string(),
        header: HEADER,
        frame_len: FRAME_LEN,
        name_offset: NAME_OFFSET,
        name_len: NAME_LEN,
        offsets,
        defaults: vec![
            (9, 0x40),  // Mix
            (10, 0x60), // Space Decay
            (11, 0x20), // Modulate
            (12, 0x40), // Lo Frequency
            (13, 0x40), // Hi Frequency
            (14, 0x00), // Pitch Vector
            (15, 0x00), // Pitch Vector Mix
            (16, 0x14), // Predelay
            (17, 0x64), // Density
            (18, 0x18), // Attack Time
            (19, 0x00), // Vibrato Depth
            (20, 0x64), // Output Level
            (28, 0x01), // Trails on
            (30, 0x7F), // Expression heel position
            (31, 0x00), // Swell
            (34, 0x00), // Algorithm: Ultraplate
        ],
    }
}
