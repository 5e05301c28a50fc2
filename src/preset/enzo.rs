//! Enzo synth preset frame.
//!
//! Offset 9 holds the synth voice mode; the CC 1-10 panel block follows at
//! offsets 10-19. Offsets and defaults come from factory preset dumps.

use std::collections::BTreeMap;

use super::PresetLayout;

const FRAME_LEN: usize = 231;
const NAME_OFFSET: usize = 212;
const NAME_LEN: usize = 16;
const HEADER: [u8; 7] = [0x00, 0x20, 0x10, 0x00, 0x03, 0x00, 0x26];

pub fn layout() -> PresetLayout {
    let mut offsets = BTreeMap::new();
    for cc in 1..=10u8 {
        offsets.insert(cc, cc as usize + 9);
    }

    PresetLayout {
        device_id: "meris_enzo".to_string(),
        header: HEADER,
        frame_len: FRAME_LEN,
        name_offset: NAME_OFFSET,
        name_len: NAME_LEN,
        offsets,
        defaults: vec![
            (9, 0x01),  // Voice mode: poly
            (10, 0x40), // Pitch centered
            (11, 0x60), // Filter
            (12, 0x7F), // Mix full wet
            (13, 0x20), // Sustain
            (14, 0x40), // Filter Envelope
            (15, 0x10), // Modulation
            (16, 0x00), // Portamento
            (17, 0x00), // Filter Type: ladder
            (18, 0x28), // Delay Level
            (19, 0x00), // Ring Modulation
            (22, 0x7F), // Expression heel position
        ],
    }
}
