//! Sound-description heuristics.
//!
//! Turns a free-text request ("brighter", "more ambient") into nudges for
//! named parameters. An ordered rule table evaluated top to bottom, first
//! matching rule wins; nudges naming parameters the device lacks are
//! dropped. A convenience for callers, not a contract anything else
//! depends on.

use crate::device::Device;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
    Set,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Increase => "increase",
            Direction::Decrease => "decrease",
            Direction::Set => "set",
        }
    }
}

/// One suggested move for a named parameter.
#[derive(Debug, Clone, Copy)]
pub struct Nudge {
    pub parameter: &'static str,
    pub direction: Direction,
    pub target: Option<u8>,
    pub reason: &'static str,
}

struct Rule {
    keywords: &'static [&'static str],
    nudges: &'static [Nudge],
}

const RULES: &[Rule] = &[
    Rule {
        keywords: &["bright", "treble", "crisp", "sharp", "sparkle"],
        nudges: &[
            Nudge {
                parameter: "Filter",
                direction: Direction::Increase,
                target: None,
                reason: "opens the high end of the repeats",
            },
            Nudge {
                parameter: "Hi Frequency",
                direction: Direction::Increase,
                target: None,
                reason: "lifts the reverb's upper band",
            },
        ],
    },
    Rule {
        keywords: &["dark", "warm", "mellow", "smooth", "dull"],
        nudges: &[
            Nudge {
                parameter: "Filter",
                direction: Direction::Decrease,
                target: None,
                reason: "rolls highs off the repeats",
            },
            Nudge {
                parameter: "Hi Frequency",
                direction: Direction::Decrease,
                target: None,
                reason: "damps the reverb's upper band",
            },
            Nudge {
                parameter: "Lo Frequency",
                direction: Direction::Increase,
                target: None,
                reason: "thickens the low end",
            },
        ],
    },
    Rule {
        keywords: &["ambient", "spacious", "huge", "wash", "atmospheric", "bigger"],
        nudges: &[
            Nudge {
                parameter: "Mix",
                direction: Direction::Increase,
                target: None,
                reason: "more wet signal",
            },
            Nudge {
                parameter: "Space Decay",
                direction: Direction::Increase,
                target: None,
                reason: "longer tail",
            },
            Nudge {
                parameter: "Feedback",
                direction: Direction::Increase,
                target: None,
                reason: "repeats hang around longer",
            },
        ],
    },
    Rule {
        keywords: &["subtle", "dry", "quieter", "less", "back off"],
        nudges: &[
            Nudge {
                parameter: "Mix",
                direction: Direction::Decrease,
                target: None,
                reason: "pulls the effect behind the dry signal",
            },
            Nudge {
                parameter: "Feedback",
                direction: Direction::Decrease,
                target: None,
                reason: "fewer trailing repeats",
            },
        ],
    },
    Rule {
        keywords: &["wobble", "chorus", "movement", "wavy", "seasick"],
        nudges: &[
            Nudge {
                parameter: "Modulation",
                direction: Direction::Increase,
                target: None,
                reason: "adds pitch movement to the repeats",
            },
            Nudge {
                parameter: "Modulate",
                direction: Direction::Increase,
                target: None,
                reason: "adds motion inside the tail",
            },
            Nudge {
                parameter: "Vibrato Depth",
                direction: Direction::Increase,
                target: None,
                reason: "adds pitch movement",
            },
        ],
    },
    Rule {
        keywords: &["slapback", "tight", "short", "rockabilly"],
        nudges: &[
            Nudge {
                parameter: "Time",
                direction: Direction::Set,
                target: Some(18),
                reason: "classic short single repeat",
            },
            Nudge {
                parameter: "Feedback",
                direction: Direction::Set,
                target: Some(10),
                reason: "one audible repeat, no tail",
            },
        ],
    },
    Rule {
        keywords: &["swell", "pad", "bloom", "volume swell"],
        nudges: &[
            Nudge {
                parameter: "Attack Time",
                direction: Direction::Increase,
                target: None,
                reason: "slows the reverb onset",
            },
            Nudge {
                parameter: "Swell",
                direction: Direction::Increase,
                target: None,
                reason: "auto-swells the input",
            },
            Nudge {
                parameter: "Sustain",
                direction: Direction::Increase,
                target: None,
                reason: "holds the synth voice longer",
            },
        ],
    },
];

/// The winning rule's nudges for this device.
#[derive(Debug, Clone)]
pub struct SuggestionSet {
    pub matched_keyword: String,
    pub nudges: Vec<Nudge>,
}

/// Evaluate the rule table against a request. `None` when no rule matches
/// or the matching rule names no parameter this device has.
pub fn suggest(request: &str, device: &Device) -> Option<SuggestionSet> {
    let request = request.to_lowercase();
    for rule in RULES {
        let Some(keyword) = rule.keywords.iter().find(|k| request.contains(*k)) else {
            continue;
        };
        let nudges: Vec<Nudge> = rule
            .nudges
            .iter()
            .filter(|n| device.parameter_named(n.parameter).is_some())
            .copied()
            .collect();
        if nudges.is_empty() {
            return None;
        }
        return Some(SuggestionSet {
            matched_keyword: keyword.to_string(),
            nudges,
        });
    }
    None
}
