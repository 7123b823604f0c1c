//! Parameter layouts for both engines

use crate::range::NormalisableRange;

/// What kind of control a parameter is
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterKind {
    /// Continuous or stepped number
    Float(NormalisableRange),
    /// One of a fixed list, stored as its index
    Choice(&'static [&'static str]),
    /// On/off, stored as 0.0 or 1.0
    Toggle,
}

/// One parameter of an engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSpec {
    /// Stable id used in state documents and the console
    pub id: &'static str,
    /// Human-readable name
    pub name: &'static str,
    pub kind: ParameterKind,
    /// Default value in plain units (choice index, 0/1 for toggles)
    pub default: f32,
}

impl ParameterSpec {
    /// Legal range in plain units
    pub fn range(&self) -> NormalisableRange {
        match self.kind {
            ParameterKind::Float(range) => range,
            ParameterKind::Choice(choices) => {
                NormalisableRange::new(0.0, choices.len().saturating_sub(1) as f32, 1.0)
            }
            ParameterKind::Toggle => NormalisableRange::new(0.0, 1.0, 1.0),
        }
    }

    /// Format a stored value for display
    pub fn display(&self, value: f32) -> String {
        match self.kind {
            ParameterKind::Float(_) => format!("{}", value),
            ParameterKind::Choice(choices) => choices
                .get(value as usize)
                .map(|name| name.to_string())
                .unwrap_or_else(|| format!("{}", value)),
            ParameterKind::Toggle => {
                if value >= 0.5 {
                    "on".to_string()
                } else {
                    "off".to_string()
                }
            }
        }
    }
}

/// Which engine a layout belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineKind {
    #[default]
    Distortion,
    Reverb,
}

impl EngineKind {
    /// Tag used in state documents and config
    pub fn name(self) -> &'static str {
        match self {
            EngineKind::Distortion => "distortion",
            EngineKind::Reverb => "reverb",
        }
    }

    /// Parse an engine tag
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "distortion" => Some(EngineKind::Distortion),
            "reverb" => Some(EngineKind::Reverb),
            _ => None,
        }
    }

    /// Parameter layout for this engine
    pub fn layout(self) -> &'static [ParameterSpec] {
        match self {
            EngineKind::Distortion => DISTORTION_LAYOUT,
            EngineKind::Reverb => REVERB_LAYOUT,
        }
    }
}

/// Transfer curve choices, in index order
pub const DISTORTION_TYPES: &[&str] = &["SOFT", "HARD", "TUBE", "FOLDBACK", "SINE"];

/// Reverb type choices, in index order
pub const REVERB_TYPES: &[&str] = &["ROOM", "HALL", "PLATE", "SPRING", "SHIMMER"];

pub const DISTORTION_LAYOUT: &[ParameterSpec] = &[
    ParameterSpec {
        id: "ghostMode",
        name: "Ghost Mode",
        kind: ParameterKind::Toggle,
        default: 0.0,
    },
    ParameterSpec {
        id: "drive",
        name: "Drive",
        kind: ParameterKind::Float(NormalisableRange::new(1.0, 25.0, 0.1)),
        default: 1.0,
    },
    ParameterSpec {
        id: "output",
        name: "Output",
        kind: ParameterKind::Float(NormalisableRange::new(0.0, 1.0, 0.01)),
        default: 0.5,
    },
    ParameterSpec {
        id: "type",
        name: "Type",
        kind: ParameterKind::Choice(DISTORTION_TYPES),
        default: 0.0,
    },
    ParameterSpec {
        id: "tone",
        name: "Tone",
        kind: ParameterKind::Float(NormalisableRange::new(0.0, 1.0, 0.01)),
        default: 0.5,
    },
    ParameterSpec {
        id: "mix",
        name: "Mix",
        kind: ParameterKind::Float(NormalisableRange::new(0.0, 1.0, 0.01)),
        default: 1.0,
    },
    ParameterSpec {
        id: "destroy",
        name: "Destroy",
        kind: ParameterKind::Float(NormalisableRange::new(0.0, 100.0, 1.0)),
        default: 0.0,
    },
];

pub const REVERB_LAYOUT: &[ParameterSpec] = &[
    ParameterSpec {
        id: "size",
        name: "Size",
        kind: ParameterKind::Float(NormalisableRange::new(0.0, 1.0, 0.01)),
        default: 0.5,
    },
    ParameterSpec {
        id: "damping",
        name: "Damping",
        kind: ParameterKind::Float(NormalisableRange::new(0.0, 1.0, 0.01)),
        default: 0.5,
    },
    ParameterSpec {
        id: "type",
        name: "Type",
        kind: ParameterKind::Choice(REVERB_TYPES),
        default: 0.0,
    },
    ParameterSpec {
        id: "predelay",
        name: "Pre-Delay",
        kind: ParameterKind::Float(NormalisableRange::new(0.0, 500.0, 1.0)),
        default: 0.0,
    },
    ParameterSpec {
        id: "mix",
        name: "Mix",
        kind: ParameterKind::Float(NormalisableRange::new(0.0, 1.0, 0.01)),
        default: 0.3,
    },
    ParameterSpec {
        id: "modulation",
        name: "Modulation",
        kind: ParameterKind::Float(NormalisableRange::new(0.0, 1.0, 0.01)),
        default: 0.0,
    },
    ParameterSpec {
        id: "lowcut",
        name: "Low Cut",
        kind: ParameterKind::Float(NormalisableRange::with_skew(20.0, 1000.0, 1.0, 0.3)),
        default: 20.0,
    },
    ParameterSpec {
        id: "highcut",
        name: "High Cut",
        kind: ParameterKind::Float(NormalisableRange::with_skew(1000.0, 20000.0, 1.0, 0.3)),
        default: 20000.0,
    },
];
