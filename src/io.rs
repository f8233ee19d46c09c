//! Lock-free Host Bridge
//!
//! Components for sharing values between a UI/automation thread and the
//! audio thread: [`ParamBank`] holds every parameter the engine reads, and
//! [`DisplayState`] receives the display mirrors the engine writes. Both are
//! built on atomics so neither side ever blocks.

use crate::params::{
    check_step_count, ConfigError, DisplaySink, ParamDescriptor, ParamId, ParamSource,
    SequenceConfig, StepParam,
};
use crate::pitch::PitchScale;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// Atomic f64 for lock-free communication between threads
///
/// Uses AtomicU64 internally since there's no native AtomicF64.
/// Reads and writes are single 64-bit operations, so they never tear.
#[derive(Debug)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    #[inline]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl Default for AtomicF64 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Clone for AtomicF64 {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

/// Atomic storage for every parameter of one sequencer instance
///
/// The step count is fixed at construction. Share it between threads with an
/// `Arc<ParamBank>`: the audio thread reads through [`ParamSource`], the UI
/// thread writes through [`ParamBank::set`] or [`ParamBank::set_normalized`].
#[derive(Debug)]
pub struct ParamBank {
    globals: [AtomicF64; 7],
    steps: Vec<[AtomicF64; 4]>,
}

impl ParamBank {
    /// Create a bank of `num_steps` steps with every value at its default
    pub fn new(num_steps: usize) -> Result<Self, ConfigError> {
        if let Err(err) = check_step_count(num_steps) {
            log::warn!(target: "pulseq::params", "rejected parameter bank: {}", err);
            return Err(err);
        }

        let globals = ParamId::GLOBALS.map(|id| AtomicF64::new(id.descriptor().default));
        let steps = (0..num_steps)
            .map(|i| StepParam::ALL.map(|p| AtomicF64::new(ParamId::Step(i, p).descriptor().default)))
            .collect();

        log::debug!(target: "pulseq::params", "created parameter bank with {} steps", num_steps);
        Ok(Self { globals, steps })
    }

    /// Create a bank holding the values of a validated configuration
    pub fn from_config(config: &SequenceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let bank = Self::new(config.num_steps())?;
        for (id, value) in config.values() {
            bank.set(id, value)?;
        }
        Ok(bank)
    }

    /// Snapshot the current values
    pub fn to_config(&self) -> SequenceConfig {
        let mut config = SequenceConfig::with_steps(0);
        config.gate_length = self.read_float(ParamId::GateLength);
        config.glide = self.read_float(ParamId::Glide);
        config.looping = self.read_bool(ParamId::Looping);
        config.pitch_extent = self.read_float(ParamId::PitchExtent);
        config.root_pitch = self.read_int(ParamId::RootPitch);
        config.pitch_scale = PitchScale::from_index(self.read_int(ParamId::PitchScale));
        config.steps = (0..self.num_steps()).map(|i| self.step(i)).collect();
        config
    }

    /// Parameter layout in registration order: globals, then four per step
    pub fn layout(&self) -> Vec<(ParamId, ParamDescriptor)> {
        ParamId::GLOBALS
            .iter()
            .copied()
            .chain((0..self.num_steps()).flat_map(|i| StepParam::ALL.map(|p| ParamId::Step(i, p))))
            .map(|id| (id, id.descriptor()))
            .collect()
    }

    /// Get a raw value, or `None` for a step past the end of the bank
    pub fn get(&self, id: ParamId) -> Option<f64> {
        self.slot(id).map(AtomicF64::get)
    }

    /// Set a value after validating it against the parameter's descriptor
    pub fn set(&self, id: ParamId, value: f64) -> Result<(), ConfigError> {
        let slot = self.slot(id).ok_or(ConfigError::StepIndexOutOfRange {
            index: step_index(id),
            num_steps: self.num_steps(),
        })?;
        match id.descriptor().validate(id, value) {
            Ok(value) => {
                slot.set(value);
                Ok(())
            }
            Err(err) => {
                log::warn!(target: "pulseq::params", "rejected write: {}", err);
                Err(err)
            }
        }
    }

    /// Set a value from a normalized (0-1) host automation value
    ///
    /// Out-of-range input is clamped and discrete parameters are quantized;
    /// writes to unknown steps are ignored.
    pub fn set_normalized(&self, id: ParamId, normalized: f64) {
        if let Some(slot) = self.slot(id) {
            let descriptor = id.descriptor();
            let normalized = if normalized.is_nan() {
                0.0
            } else {
                normalized.clamp(0.0, 1.0)
            };
            slot.set(descriptor.quantize(descriptor.denormalize(normalized)));
        }
    }

    fn slot(&self, id: ParamId) -> Option<&AtomicF64> {
        match id {
            ParamId::Step(index, param) => self.steps.get(index).map(|slots| &slots[param as usize]),
            global => global_index(global).map(|i| &self.globals[i]),
        }
    }
}

fn global_index(id: ParamId) -> Option<usize> {
    ParamId::GLOBALS.iter().position(|&global| global == id)
}

fn step_index(id: ParamId) -> usize {
    match id {
        ParamId::Step(index, _) => index,
        _ => 0,
    }
}

impl ParamSource for ParamBank {
    #[inline]
    fn read_float(&self, id: ParamId) -> f64 {
        self.slot(id).map(AtomicF64::get).unwrap_or(0.0)
    }

    #[inline]
    fn read_int(&self, id: ParamId) -> i32 {
        libm::round(self.read_float(id)) as i32
    }

    #[inline]
    fn read_bool(&self, id: ParamId) -> bool {
        self.read_float(id) >= 0.5
    }

    #[inline]
    fn num_steps(&self) -> usize {
        self.steps.len()
    }
}

/// Display mirrors published by the engine, readable from any thread
#[derive(Debug, Default)]
pub struct DisplayState {
    current_step: AtomicUsize,
    triggered: AtomicBool,
    running: AtomicBool,
    end_of_sequence: AtomicBool,
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_step(&self) -> usize {
        self.current_step.load(Ordering::Relaxed)
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn is_end_of_sequence(&self) -> bool {
        self.end_of_sequence.load(Ordering::Relaxed)
    }
}

impl DisplaySink for DisplayState {
    #[inline]
    fn show_step(&self, step: usize) {
        self.current_step.store(step, Ordering::Relaxed);
    }

    #[inline]
    fn show_triggered(&self, triggered: bool) {
        self.triggered.store(triggered, Ordering::Relaxed);
    }

    #[inline]
    fn show_running(&self, running: bool) {
        self.running.store(running, Ordering::Relaxed);
    }

    #[inline]
    fn show_end_of_sequence(&self, active: bool) {
        self.end_of_sequence.store(active, Ordering::Relaxed);
    }
}
