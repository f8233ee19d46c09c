//! Step Configuration
//!
//! One [`StepConfig`] record per sequence position. The records are read from
//! the host's parameters every time the engine needs them; the engine never
//! stores or edits them.

use serde::{Deserialize, Serialize};

/// Smallest pulse count a step may occupy
pub const MIN_PULSE_COUNT: u32 = 1;

/// Largest pulse count a step may occupy
pub const MAX_PULSE_COUNT: u32 = 8;

/// How long a step's gate stays open relative to its pulses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMode {
    /// The gate never opens
    Silence,
    /// One gate on the step's first pulse
    #[default]
    SinglePulse,
    /// A fresh gate on every pulse of the step
    MultiPulse,
    /// One gate held across all of the step's pulses
    HoldForPulse,
}

impl GateMode {
    pub const ALL: [GateMode; 4] = [
        GateMode::Silence,
        GateMode::SinglePulse,
        GateMode::MultiPulse,
        GateMode::HoldForPulse,
    ];

    /// Map a parameter index to a mode, saturating out-of-range values
    pub fn from_index(index: i32) -> Self {
        match index {
            i32::MIN..=0 => GateMode::Silence,
            1 => GateMode::SinglePulse,
            2 => GateMode::MultiPulse,
            _ => GateMode::HoldForPulse,
        }
    }

    pub fn index(&self) -> i32 {
        match self {
            GateMode::Silence => 0,
            GateMode::SinglePulse => 1,
            GateMode::MultiPulse => 2,
            GateMode::HoldForPulse => 3,
        }
    }

    /// Whether a step in this mode ever opens the gate
    pub fn opens_gate(&self) -> bool {
        !matches!(self, GateMode::Silence)
    }

    /// Whether the gate is re-opened on every pulse rather than only the first
    pub fn retriggers_each_pulse(&self) -> bool {
        matches!(self, GateMode::MultiPulse)
    }
}

/// Configuration of one sequence position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepConfig {
    /// Normalized pitch in [0, 1], scaled by the pitch extent
    pub pitch: f64,

    /// Disabled steps are skipped and never open a gate
    pub enabled: bool,

    pub gate_mode: GateMode,

    /// Clock pulses the step occupies before the sequence advances
    pub pulse_count: u32,
}

impl StepConfig {
    pub fn new(pitch: f64) -> Self {
        Self {
            pitch,
            ..Self::default()
        }
    }

    pub fn with_gate_mode(mut self, gate_mode: GateMode) -> Self {
        self.gate_mode = gate_mode;
        self
    }

    pub fn with_pulse_count(mut self, pulse_count: u32) -> Self {
        self.pulse_count = pulse_count;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            pitch: 0.0,
            enabled: true,
            gate_mode: GateMode::SinglePulse,
            pulse_count: MIN_PULSE_COUNT,
        }
    }
}
