//! Signal Conventions and Channel Layout
//!
//! This module defines the signal kinds the sequencer reads and writes, the
//! high/low threshold used for edge detection, and the fixed channel layout of
//! the in-place processing bus (four control inputs, three outputs).

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Unique identifier for a port (its channel index on the bus)
pub type PortId = usize;

/// Channel carrying the clock input
pub const CLOCK_INPUT: PortId = 0;
/// Channel carrying the reset input
pub const RESET_INPUT: PortId = 1;
/// Channel carrying the start input
pub const START_INPUT: PortId = 2;
/// Channel carrying the stop input
pub const STOP_INPUT: PortId = 3;

/// Channel receiving the trigger/gate output
pub const TRIGGER_OUTPUT: PortId = 0;
/// Channel receiving the pitch CV output
pub const PITCH_OUTPUT: PortId = 1;
/// Channel receiving the end-of-sequence pulse
pub const END_OF_SEQUENCE_OUTPUT: PortId = 2;

/// Number of channels the bus needs (inputs and outputs share channels)
pub const BUS_CHANNELS: usize = 4;

/// Level at or above which a control input counts as high
pub const HIGH_THRESHOLD: f64 = 0.5;

/// Full-scale level written for an active gate or pulse
pub const FULL_SCALE: f64 = 1.0;

/// Returns true when a raw control sample counts as high.
#[inline]
pub fn is_high(value: f64) -> bool {
    value >= HIGH_THRESHOLD
}

/// Semantic signal classification for the sequencer's ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    /// Clock pulses; each rising edge is one pulse
    Clock,

    /// Momentary trigger (reset, start, stop)
    Trigger,

    /// Gate signal, 0 (low) or full scale (high)
    Gate,

    /// Continuous pitch control voltage
    PitchCv,
}

/// Definition of a single port (input or output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortDef {
    /// Channel index on the bus
    pub id: PortId,

    /// Human-readable name (e.g., "clock", "pitch")
    pub name: String,

    /// Signal type for host-side labelling
    pub kind: SignalKind,
}

impl PortDef {
    pub fn new(id: PortId, name: impl Into<String>, kind: SignalKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
        }
    }
}

/// Specification of all ports for the sequencer bus
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortSpec {
    pub inputs: Vec<PortDef>,
    pub outputs: Vec<PortDef>,
}

impl PortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sequencer's fixed layout: clock/reset/start/stop in, trigger/pitch/eos out
    pub fn sequencer() -> Self {
        Self {
            inputs: vec![
                PortDef::new(CLOCK_INPUT, "clock", SignalKind::Clock),
                PortDef::new(RESET_INPUT, "reset", SignalKind::Trigger),
                PortDef::new(START_INPUT, "start", SignalKind::Trigger),
                PortDef::new(STOP_INPUT, "stop", SignalKind::Trigger),
            ],
            outputs: vec![
                PortDef::new(TRIGGER_OUTPUT, "trigger", SignalKind::Gate),
                PortDef::new(PITCH_OUTPUT, "pitch", SignalKind::PitchCv),
                PortDef::new(END_OF_SEQUENCE_OUTPUT, "eos", SignalKind::Gate),
            ],
        }
    }

    pub fn input_by_name(&self, name: &str) -> Option<&PortDef> {
        self.inputs.iter().find(|p| p.name == name)
    }

    pub fn input_by_id(&self, id: PortId) -> Option<&PortDef> {
        self.inputs.iter().find(|p| p.id == id)
    }

    pub fn output_by_id(&self, id: PortId) -> Option<&PortDef> {
        self.outputs.iter().find(|p| p.id == id)
    }

    /// Channels the host must provide for in-place processing
    pub fn channel_count(&self) -> usize {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .map(|p| p.id + 1)
            .max()
            .unwrap_or(0)
    }
}
