//! Gate Timing Unit
//!
//! Gate lengths are sized from the most recently *completed* clock interval:
//! the current interval's length is unknown until its closing edge arrives,
//! so every gate lags the tempo by one pulse.

use crate::step::GateMode;

/// Interval assumed before any pulse interval has been measured
pub const FALLBACK_PULSE_SAMPLES: u32 = 5000;

/// Fraction of a held step's span the gate stays open, leaving a visible gap
/// before the next step's gate
pub const HOLD_FRACTION: f64 = 0.99;

/// Gate length in samples for a step's gate mode
///
/// `samples_per_pulse` is the last measured interval (already substituted
/// with the fallback when nothing has been measured).
pub fn gate_length(
    mode: GateMode,
    samples_per_pulse: f64,
    pulse_count: u32,
    gate_length_fraction: f64,
) -> f64 {
    match mode {
        GateMode::Silence => 0.0,
        GateMode::SinglePulse | GateMode::MultiPulse => samples_per_pulse * gate_length_fraction,
        GateMode::HoldForPulse => samples_per_pulse * pulse_count as f64 * HOLD_FRACTION,
    }
}

/// Rolling clock-interval measurements
///
/// Counters saturate at `u32::MAX` rather than wrapping; only the fallback
/// path cares about intervals that long.
#[derive(Debug, Clone, Default)]
pub struct PulseTiming {
    samples_since_last_pulse: u32,
    samples_since_second_last_pulse: u32,
    samples_per_pulse: u32,
}

impl PulseTiming {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the current interval on a clock edge
    pub fn record_pulse(&mut self) {
        self.samples_per_pulse = self.samples_since_last_pulse;
        self.samples_since_second_last_pulse = self.samples_since_last_pulse;
        self.samples_since_last_pulse = 0;
    }

    /// Resume after a stop as if the last interval had just completed
    pub fn resume(&mut self) {
        self.samples_since_last_pulse = self.samples_since_second_last_pulse;
    }

    /// Advance by one sample
    #[inline]
    pub fn tick(&mut self) {
        self.samples_since_last_pulse = self.samples_since_last_pulse.saturating_add(1);
    }

    /// Last measured interval, 0 when nothing has been measured yet
    #[inline]
    pub fn samples_per_pulse(&self) -> u32 {
        self.samples_per_pulse
    }

    #[inline]
    pub fn samples_since_last_pulse(&self) -> u32 {
        self.samples_since_last_pulse
    }

    /// Interval used for sizing gates, falling back when unmeasured
    #[inline]
    pub fn interval(&self) -> f64 {
        match self.samples_per_pulse {
            0 => FALLBACK_PULSE_SAMPLES as f64,
            samples => samples as f64,
        }
    }
}

/// A gate that closes after a fixed number of samples
#[derive(Debug, Clone, Default)]
pub struct GateTimer {
    open: bool,
    samples_since_open: u32,
    length_samples: f64,
}

impl GateTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)open the gate for `length_samples`, restarting the countdown
    pub fn open(&mut self, length_samples: f64) {
        self.open = true;
        self.samples_since_open = 0;
        self.length_samples = length_samples;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[inline]
    pub fn length_samples(&self) -> f64 {
        self.length_samples
    }

    /// Run this sample's closing check, then count the sample
    ///
    /// A gate opened for `n` samples reads open on exactly `n` consecutive
    /// samples, counting the sample it was opened on.
    #[inline]
    pub fn tick(&mut self) {
        if self.open {
            if self.samples_since_open as f64 >= self.length_samples {
                self.open = false;
            }
            self.samples_since_open = self.samples_since_open.saturating_add(1);
        }
    }
}
