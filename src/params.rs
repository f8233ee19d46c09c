//! Parameters and Display Mirrors
//!
//! The engine never owns its parameters. It reads them through the narrow
//! [`ParamSource`] capability and publishes a few read-only display values
//! through [`DisplaySink`]. This module also declares the parameter layout
//! (ranges, defaults, discrete steps) a host registers, and the serializable
//! [`SequenceConfig`] snapshot validated against that layout.

use crate::pitch::{PitchScale, MAX_ROOT_PITCH};
use crate::step::{GateMode, StepConfig, MAX_PULSE_COUNT, MIN_PULSE_COUNT};
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Largest sequence a bank can hold
pub const MAX_STEPS: usize = 32;

/// Sequence length used by [`SequenceConfig::default`]
pub const DEFAULT_NUM_STEPS: usize = 8;

/// Per-step parameter selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepParam {
    Pitch,
    Enabled,
    GateMode,
    PulseCount,
}

impl StepParam {
    pub const ALL: [StepParam; 4] = [
        StepParam::Pitch,
        StepParam::Enabled,
        StepParam::GateMode,
        StepParam::PulseCount,
    ];
}

/// Identifier of every parameter the engine reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamId {
    /// Fraction of a pulse interval a single gate stays open
    GateLength,
    /// 0 = no glide, 1 = slowest glide
    Glide,
    /// Wrap around at the end of the sequence instead of stopping
    Looping,
    /// Scale applied to every step's normalized pitch
    PitchExtent,
    RootPitch,
    PitchScale,
    /// A rising edge flips the running state at the next block
    ToggleRunning,
    Step(usize, StepParam),
}

impl ParamId {
    /// Global parameters in registration order
    pub const GLOBALS: [ParamId; 7] = [
        ParamId::GateLength,
        ParamId::Glide,
        ParamId::Looping,
        ParamId::PitchExtent,
        ParamId::RootPitch,
        ParamId::PitchScale,
        ParamId::ToggleRunning,
    ];

    /// Range, default and resolution of this parameter
    pub fn descriptor(&self) -> ParamDescriptor {
        match self {
            ParamId::GateLength => ParamDescriptor::float("gateLength", "Gate Length", 0.0, 0.95, 0.75),
            ParamId::Glide => ParamDescriptor::float("glide", "Glide", 0.0, 1.0, 0.0),
            ParamId::Looping => ParamDescriptor::boolean("looping", "Looping", true),
            ParamId::PitchExtent => {
                ParamDescriptor::float("pitchExtent", "Pitch Extent", 0.2, 1.0, 0.2)
            }
            ParamId::RootPitch => {
                ParamDescriptor::int("rootPitch", "Root Pitch", 0, MAX_ROOT_PITCH, 0)
            }
            ParamId::PitchScale => ParamDescriptor::int(
                "pitchScale",
                "Pitch Scale",
                PitchScale::Unscaled.index(),
                PitchScale::Minor.index(),
                PitchScale::Unscaled.index(),
            ),
            ParamId::ToggleRunning => {
                ParamDescriptor::boolean("toggleRunning", "Toggle Running", false)
            }
            ParamId::Step(_, StepParam::Pitch) => {
                ParamDescriptor::float("stepPitch", "Step Pitch", 0.0, 1.0, 0.0)
            }
            ParamId::Step(_, StepParam::Enabled) => {
                ParamDescriptor::boolean("stepOn", "Step On/Off", true)
            }
            ParamId::Step(_, StepParam::GateMode) => ParamDescriptor::int(
                "stepGateMode",
                "Step Gate Mode",
                GateMode::Silence.index(),
                GateMode::HoldForPulse.index(),
                GateMode::SinglePulse.index(),
            ),
            ParamId::Step(_, StepParam::PulseCount) => ParamDescriptor::int(
                "stepPulseCount",
                "Step Pulse Count",
                MIN_PULSE_COUNT as i32,
                MAX_PULSE_COUNT as i32,
                MIN_PULSE_COUNT as i32,
            ),
        }
    }

    /// Host-facing key, e.g. `"glide"` or `"stepPulseCount_3"`
    pub fn key(&self) -> String {
        let base = self.descriptor().key;
        match self {
            ParamId::Step(index, _) => format!("{}_{}", base, index),
            _ => String::from(base),
        }
    }
}

/// How the host should present a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Float,
    Int,
    Bool,
}

/// Parameter definition for host registration
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamDescriptor {
    /// Key prefix (step parameters get `_<index>` appended)
    pub key: &'static str,
    /// Display name
    pub name: &'static str,
    pub kind: ParamKind,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    /// Number of discrete steps across the range (0 = continuous)
    pub steps: u32,
}

impl ParamDescriptor {
    pub fn float(key: &'static str, name: &'static str, min: f64, max: f64, default: f64) -> Self {
        Self {
            key,
            name,
            kind: ParamKind::Float,
            min,
            max,
            default,
            steps: 0,
        }
    }

    pub fn int(key: &'static str, name: &'static str, min: i32, max: i32, default: i32) -> Self {
        Self {
            key,
            name,
            kind: ParamKind::Int,
            min: min as f64,
            max: max as f64,
            default: default as f64,
            steps: (max - min).max(0) as u32,
        }
    }

    pub fn boolean(key: &'static str, name: &'static str, default: bool) -> Self {
        Self {
            key,
            name,
            kind: ParamKind::Bool,
            min: 0.0,
            max: 1.0,
            default: if default { 1.0 } else { 0.0 },
            steps: 1,
        }
    }

    /// Normalize a value to 0.0-1.0 range
    pub fn normalize(&self, value: f64) -> f64 {
        if self.max > self.min {
            (value - self.min) / (self.max - self.min)
        } else {
            0.0
        }
    }

    /// Denormalize from 0.0-1.0 to parameter range
    pub fn denormalize(&self, normalized: f64) -> f64 {
        self.min + normalized * (self.max - self.min)
    }

    /// Quantize to steps (if discrete)
    pub fn quantize(&self, value: f64) -> f64 {
        if self.steps == 0 {
            return value;
        }
        let step_size = (self.max - self.min) / self.steps as f64;
        let steps = libm::round((value - self.min) / step_size);
        self.min + steps * step_size
    }

    /// Check a value against this descriptor, returning it quantized
    pub fn validate(&self, id: ParamId, value: f64) -> Result<f64, ConfigError> {
        if value.is_nan() {
            return Err(ConfigError::NotANumber { param: id });
        }
        if value < self.min || value > self.max {
            return Err(ConfigError::ValueOutOfRange {
                param: id,
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(self.quantize(value))
    }
}

/// Error types for configuration-time operations
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    StepCountOutOfRange {
        count: usize,
    },
    StepIndexOutOfRange {
        index: usize,
        num_steps: usize,
    },
    ValueOutOfRange {
        param: ParamId,
        value: f64,
        min: f64,
        max: f64,
    },
    NotANumber {
        param: ParamId,
    },
    SampleRateOutOfRange {
        sample_rate: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::StepCountOutOfRange { count } => {
                write!(f, "Step count {} outside 1..={}", count, MAX_STEPS)
            }
            ConfigError::StepIndexOutOfRange { index, num_steps } => {
                write!(f, "Step {} out of range for {} steps", index, num_steps)
            }
            ConfigError::ValueOutOfRange {
                param,
                value,
                min,
                max,
            } => write!(
                f,
                "Value {} for {} outside [{}, {}]",
                value,
                param.key(),
                min,
                max
            ),
            ConfigError::NotANumber { param } => write!(f, "NaN written to {}", param.key()),
            ConfigError::SampleRateOutOfRange { sample_rate } => {
                write!(f, "Sample rate {} Hz must be finite and positive", sample_rate)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Read-only access to live parameter values
///
/// Implementations must make each individual read lock-free and
/// non-tearing; values may change between any two reads.
pub trait ParamSource {
    fn read_float(&self, id: ParamId) -> f64;

    fn read_int(&self, id: ParamId) -> i32;

    fn read_bool(&self, id: ParamId) -> bool;

    /// Number of sequence positions; fixed for the source's lifetime
    fn num_steps(&self) -> usize;

    /// Assemble the configuration record of one step
    fn step(&self, index: usize) -> StepConfig {
        StepConfig {
            pitch: self
                .read_float(ParamId::Step(index, StepParam::Pitch))
                .clamp(0.0, 1.0),
            enabled: self.read_bool(ParamId::Step(index, StepParam::Enabled)),
            gate_mode: GateMode::from_index(
                self.read_int(ParamId::Step(index, StepParam::GateMode)),
            ),
            pulse_count: self
                .read_int(ParamId::Step(index, StepParam::PulseCount))
                .max(MIN_PULSE_COUNT as i32) as u32,
        }
    }

    /// Whether at least one step is enabled
    fn any_step_enabled(&self) -> bool {
        (0..self.num_steps()).any(|i| self.read_bool(ParamId::Step(i, StepParam::Enabled)))
    }
}

impl<T: ParamSource + ?Sized> ParamSource for &T {
    fn read_float(&self, id: ParamId) -> f64 {
        (**self).read_float(id)
    }

    fn read_int(&self, id: ParamId) -> i32 {
        (**self).read_int(id)
    }

    fn read_bool(&self, id: ParamId) -> bool {
        (**self).read_bool(id)
    }

    fn num_steps(&self) -> usize {
        (**self).num_steps()
    }
}

impl<T: ParamSource + ?Sized> ParamSource for Arc<T> {
    fn read_float(&self, id: ParamId) -> f64 {
        (**self).read_float(id)
    }

    fn read_int(&self, id: ParamId) -> i32 {
        (**self).read_int(id)
    }

    fn read_bool(&self, id: ParamId) -> bool {
        (**self).read_bool(id)
    }

    fn num_steps(&self) -> usize {
        (**self).num_steps()
    }
}

/// Write-only mirrors of engine state for host-side display
///
/// The engine never reads these back.
pub trait DisplaySink {
    fn show_step(&self, step: usize);

    fn show_triggered(&self, triggered: bool);

    fn show_running(&self, running: bool);

    fn show_end_of_sequence(&self, active: bool);
}

impl DisplaySink for () {
    fn show_step(&self, _: usize) {}

    fn show_triggered(&self, _: bool) {}

    fn show_running(&self, _: bool) {}

    fn show_end_of_sequence(&self, _: bool) {}
}

impl<T: DisplaySink + ?Sized> DisplaySink for &T {
    fn show_step(&self, step: usize) {
        (**self).show_step(step)
    }

    fn show_triggered(&self, triggered: bool) {
        (**self).show_triggered(triggered)
    }

    fn show_running(&self, running: bool) {
        (**self).show_running(running)
    }

    fn show_end_of_sequence(&self, active: bool) {
        (**self).show_end_of_sequence(active)
    }
}

impl<T: DisplaySink + ?Sized> DisplaySink for Arc<T> {
    fn show_step(&self, step: usize) {
        (**self).show_step(step)
    }

    fn show_triggered(&self, triggered: bool) {
        (**self).show_triggered(triggered)
    }

    fn show_running(&self, running: bool) {
        (**self).show_running(running)
    }

    fn show_end_of_sequence(&self, active: bool) {
        (**self).show_end_of_sequence(active)
    }
}

/// Serializable snapshot of every parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceConfig {
    pub gate_length: f64,
    pub glide: f64,
    pub looping: bool,
    pub pitch_extent: f64,
    pub root_pitch: i32,
    pub pitch_scale: PitchScale,
    pub steps: Vec<StepConfig>,
}

impl SequenceConfig {
    /// Default globals with `num_steps` default steps
    pub fn with_steps(num_steps: usize) -> Self {
        Self {
            gate_length: ParamId::GateLength.descriptor().default,
            glide: ParamId::Glide.descriptor().default,
            looping: true,
            pitch_extent: ParamId::PitchExtent.descriptor().default,
            root_pitch: 0,
            pitch_scale: PitchScale::Unscaled,
            steps: vec![StepConfig::default(); num_steps],
        }
    }

    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }

    /// Flatten into `(ParamId, value)` pairs in registration order
    pub fn values(&self) -> Vec<(ParamId, f64)> {
        let mut values = vec![
            (ParamId::GateLength, self.gate_length),
            (ParamId::Glide, self.glide),
            (ParamId::Looping, bool_value(self.looping)),
            (ParamId::PitchExtent, self.pitch_extent),
            (ParamId::RootPitch, self.root_pitch as f64),
            (ParamId::PitchScale, self.pitch_scale.index() as f64),
            (
                ParamId::ToggleRunning,
                ParamId::ToggleRunning.descriptor().default,
            ),
        ];
        for (i, step) in self.steps.iter().enumerate() {
            values.push((ParamId::Step(i, StepParam::Pitch), step.pitch));
            values.push((ParamId::Step(i, StepParam::Enabled), bool_value(step.enabled)));
            values.push((
                ParamId::Step(i, StepParam::GateMode),
                step.gate_mode.index() as f64,
            ));
            values.push((
                ParamId::Step(i, StepParam::PulseCount),
                step.pulse_count as f64,
            ));
        }
        values
    }

    /// Check the step count and every value against its descriptor
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_step_count(self.steps.len())?;
        for (id, value) in self.values() {
            id.descriptor().validate(id, value)?;
        }
        Ok(())
    }
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self::with_steps(DEFAULT_NUM_STEPS)
    }
}

pub(crate) fn check_step_count(count: usize) -> Result<(), ConfigError> {
    if (1..=MAX_STEPS).contains(&count) {
        Ok(())
    } else {
        Err(ConfigError::StepCountOutOfRange { count })
    }
}

#[inline]
fn bool_value(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_descriptor_ranges_match_registration_table() {
        let gate = ParamId::GateLength.descriptor();
        assert_eq!((gate.min, gate.max, gate.default), (0.0, 0.95, 0.75));

        let extent = ParamId::PitchExtent.descriptor();
        assert_eq!((extent.min, extent.max, extent.default), (0.2, 1.0, 0.2));

        let pulses = ParamId::Step(0, StepParam::PulseCount).descriptor();
        assert_eq!((pulses.min, pulses.max), (1.0, 8.0));
        assert_eq!(pulses.steps, 7);

        let mode = ParamId::Step(3, StepParam::GateMode).descriptor();
        assert_eq!(mode.default, 1.0);
        assert_eq!(mode.kind, ParamKind::Int);
    }

    #[test]
    fn test_param_keys() {
        assert_eq!(ParamId::Glide.key(), "glide");
        assert_eq!(ParamId::Step(3, StepParam::PulseCount).key(), "stepPulseCount_3");
        assert_eq!(ParamId::Step(0, StepParam::Enabled).key(), "stepOn_0");
    }

    #[test]
    fn test_normalize_denormalize() {
        let extent = ParamId::PitchExtent.descriptor();
        assert_relative_eq!(extent.normalize(0.6), 0.5);
        assert_relative_eq!(extent.denormalize(0.5), 0.6);
    }

    #[test]
    fn test_quantize_discrete() {
        let pulses = ParamId::Step(0, StepParam::PulseCount).descriptor();
        assert_eq!(pulses.quantize(3.4), 3.0);
        assert_eq!(pulses.quantize(3.6), 4.0);

        let glide = ParamId::Glide.descriptor();
        assert_eq!(glide.quantize(0.123), 0.123);
    }

    #[test]
    fn test_validate_rejects_out_of_range_and_nan() {
        let id = ParamId::GateLength;
        let descriptor = id.descriptor();

        assert_eq!(descriptor.validate(id, 0.5), Ok(0.5));
        assert!(matches!(
            descriptor.validate(id, 0.99),
            Err(ConfigError::ValueOutOfRange { .. })
        ));
        assert_eq!(
            descriptor.validate(id, f64::NAN),
            Err(ConfigError::NotANumber { param: id })
        );
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = SequenceConfig::default();
        assert_eq!(config.num_steps(), DEFAULT_NUM_STEPS);
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.values().len(), 7 + 4 * DEFAULT_NUM_STEPS);
    }

    #[test]
    fn test_config_rejects_bad_step_count() {
        let empty = SequenceConfig::with_steps(0);
        assert_eq!(
            empty.validate(),
            Err(ConfigError::StepCountOutOfRange { count: 0 })
        );

        let huge = SequenceConfig::with_steps(MAX_STEPS + 1);
        assert!(huge.validate().is_err());
    }

    #[test]
    fn test_config_rejects_bad_pulse_count() {
        let mut config = SequenceConfig::default();
        config.steps[2].pulse_count = 9;

        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ValueOutOfRange {
                param: ParamId::Step(2, StepParam::PulseCount),
                ..
            }
        ));
    }

    #[test]
    fn test_config_serialized_shape() {
        let mut config = SequenceConfig::with_steps(1);
        config.steps[0].gate_mode = GateMode::HoldForPulse;

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["looping"], serde_json::json!(true));
        assert_eq!(json["pitch_scale"], serde_json::json!("unscaled"));
        assert_eq!(json["steps"][0]["gate_mode"], serde_json::json!("hold_for_pulse"));
        assert_eq!(json["steps"][0]["pulse_count"], serde_json::json!(1));
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::StepIndexOutOfRange {
            index: 9,
            num_steps: 8,
        };
        assert_eq!(format!("{}", err), "Step 9 out of range for 8 steps");

        let err = ConfigError::SampleRateOutOfRange { sample_rate: -1.0 };
        assert_eq!(
            format!("{}", err),
            "Sample rate -1 Hz must be finite and positive"
        );
    }

    struct FixedSource;

    impl ParamSource for FixedSource {
        fn read_float(&self, _: ParamId) -> f64 {
            1.7
        }

        fn read_int(&self, id: ParamId) -> i32 {
            match id {
                ParamId::Step(_, StepParam::PulseCount) => 0,
                _ => 12,
            }
        }

        fn read_bool(&self, _: ParamId) -> bool {
            false
        }

        fn num_steps(&self) -> usize {
            3
        }
    }

    #[test]
    fn test_step_record_clamps_invalid_reads() {
        let step = FixedSource.step(1);
        assert_eq!(step.pitch, 1.0);
        assert_eq!(step.pulse_count, 1);
        assert_eq!(step.gate_mode, GateMode::HoldForPulse);
        assert!(!step.enabled);
        assert!(!FixedSource.any_step_enabled());
    }
}
