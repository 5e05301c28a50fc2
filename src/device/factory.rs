//! Factory device seed.
//!
//! Control numbers and ranges mirror the shipped hardware; treat edits here
//! the same as a firmware change. Devices added at runtime may replace these
//! wholesale through the catalog.

use super::{Device, Parameter};
use crate::midi::DATA_MAX;

fn cc_param(name: &str, control_number: u8) -> Parameter {
    Parameter {
        name: name.to_string(),
        control_number,
        min_value: 0,
        max_value: DATA_MAX,
        description: None,
        unit: None,
        category: None,
    }
}

fn ranged_param(name: &str, control_number: u8, min_value: u8, max_value: u8) -> Parameter {
    Parameter {
        name: name.to_string(),
        control_number,
        min_value,
        max_value,
        description: None,
        unit: None,
        category: None,
    }
}

/// The four Meris units the server ships knowing about.
pub fn factory_devices() -> Vec<Device> {
    vec![meris_lvx(), meris_mercury7(), meris_polymoon(), meris_enzo()]
}

/// LVX delay. CC-only: the LVX preset memory is not addressable over SysEx,
/// so it carries no composer layout.
pub fn meris_lvx() -> Device {
    let mut filter = cc_param("Filter", 5);
    filter.description = Some("Low pass cutoff in the delay feedback path".to_string());
    filter.category = Some("delay".to_string());

    let mut bypass = cc_param("Bypass", 14);
    bypass.description = Some("0-63 bypassed, 64-127 engaged".to_string());
    bypass.category = Some("global".to_string());

    Device {
        id: "meris_lvx".to_string(),
        manufacturer: "Meris".to_string(),
        model_name: "LVX".to_string(),
        version: None,
        control_channel: 1,
        parameters: vec![
            cc_param("Mix", 2),
            cc_param("Time", 3),
            cc_param("Feedback", 4),
            filter,
            cc_param("Cross Color", 6),
            cc_param("Modulation", 7),
            cc_param("Delay Structure", 8),
            cc_param("Note Division", 9),
            cc_param("Dynamics", 10),
            cc_param("Output Level", 11),
            cc_param("Looper Level", 12),
            bypass,
        ],
        description: Some("Modular delay system".to_string()),
    }
}

/// Mercury7 reverb. Parameters 1-12 also live in the preset frame.
pub fn meris_mercury7() -> Device {
    let mut algorithm = ranged_param("Algorithm", 26, 0, 1);
    algorithm.description = Some("0 Ultraplate, 1 Cathedra".to_string());

    Device {
        id: "meris_mercury7".to_string(),
        manufacturer: "Meris".to_string(),
        model_name: "Mercury7".to_string(),
        version: None,
        control_channel: 2,
        parameters: vec![
            cc_param("Mix", 1),
            cc_param("Space Decay", 2),
            cc_param("Modulate", 3),
            cc_param("Lo Frequency", 4),
            cc_param("Hi Frequency", 5),
            cc_param("Pitch Vector", 6),
            cc_param("Pitch Vector Mix", 7),
            cc_param("Predelay", 8),
            cc_param("Density", 9),
            cc_param("Attack Time", 10),
            cc_param("Vibrato Depth", 11),
            cc_param("Output Level", 12),
            cc_param("Bypass", 14),
            cc_param("Swell", 23),
            algorithm,
        ],
        description: Some("Algorithmic reverb".to_string()),
    }
}

/// Polymoon delay. Parameters sit on CC 16-27 with a matching preset block.
pub fn meris_polymoon() -> Device {
    Device {
        id: "meris_polymoon".to_string(),
        manufacturer: "Meris".to_string(),
        model_name: "Polymoon".to_string(),
        version: None,
        control_channel: 3,
        parameters: vec![
            cc_param("Time", 16),
            cc_param("Feedback", 17),
            cc_param("Mix", 18),
            cc_param("Multiply", 19),
            cc_param("Dimension", 20),
            cc_param("Dynamics", 21),
            cc_param("Early Modulation", 22),
            cc_param("Late Modulation", 23),
            cc_param("Delay Level", 24),
            cc_param("Flanger Speed", 25),
            cc_param("Flanger Feedback", 26),
            ranged_param("Half Speed", 27, 0, 1),
            cc_param("Tap", 28),
        ],
        description: Some("Multi-tap modulated delay".to_string()),
    }
}

/// Enzo synth. Parameters 1-10 also live in the preset frame.
pub fn meris_enzo() -> Device {
    Device {
        id: "meris_enzo".to_string(),
        manufacturer: "Meris".to_string(),
        model_name: "Enzo".to_string(),
        version: None,
        control_channel: 4,
        parameters: vec![
            cc_param("Pitch", 1),
            cc_param("Filter", 2),
            cc_param("Mix", 3),
            cc_param("Sustain", 4),
            cc_param("Filter Envelope", 5),
            cc_param("Modulation", 6),
            cc_param("Portamento", 7),
            ranged_param("Filter Type", 8, 0, 3),
            cc_param("Delay Level", 9),
            cc_param("Ring Modulation", 10),
            cc_param("Bypass", 14),
        ],
        description: Some("Multi-voice instrument synthesizer".to_string()),
    }
}
