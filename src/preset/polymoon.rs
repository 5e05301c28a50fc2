//! Polymoon delay preset frame.
//!
//! The Polymoon maps its panel to CC 16-27; in the frame those land on the
//! same offsets 9-20 the other families use. Offsets and defaults come from
//! factory preset dumps.

use std::collections::BTreeMap;

use super::PresetLayout;

const FRAME_LEN: usize = 231;
const NAME_OFFSET: usize = 212;
const NAME_LEN: usize = 16;
const HEADER: [u8; 7] = [0x00, 0x20, 0x10, 0x00, 0x02, 0x00, 0x26];

pub fn layout() -> PresetLayout {
    let mut offsets = BTreeMap::new();
    for cc in 16..=27u8 {
        offsets.insert(cc, cc as usize - 7);
    }

    PresetLayout {
        device_id: "meris_polymoon".to_string(),
        header: HEADER,
        frame_len: FRAME_LEN,
        name_offset: NAME_OFFSET,
        name_len: NAME_LEN,
        offsets,
        defaults: vec![
            (9, 0x3C),  // Time
            (10, 0x30), // Feedback
            (11, 0x40), // Mix
            (12, 0x00), // Multiply
            (13, 0x20), // Dimension
            (14, 0x40), // Dynamics
            (15, 0x18), // Early Modulation
            (16, 0x18), // Late Modulation
            (17, 0x64), // Delay Level
            (18, 0x00), // Flanger Speed
            (19, 0x00), // Flanger Feedback
            (20, 0x00), // Half Speed off
            (26, 0x02), // Tap division: quarter
        ],
    }
}
