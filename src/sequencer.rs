//! Step Sequencer Engine
//!
//! The per-sample state machine: transport edges advance a cursor through
//! the enabled steps, open gates sized by the last clock interval, and feed
//! the glide filter while a gate is open.
//!
//! Order of work on every sample:
//!
//! 1. transport (reset, then start)
//! 2. step/pulse advancement on a clock edge
//! 3. gate closing checks
//! 4. glide cutoff update and pitch smoothing
//! 5. output composition

use crate::buffer::AudioBuffer;
use crate::gate::{gate_length, GateTimer, PulseTiming};
use crate::glide::GlideFilter;
use crate::output::{compose, ControlFrame, OutputFrame};
use crate::params::{ConfigError, DisplaySink, ParamId, ParamSource};
use crate::pitch::{quantize, PitchScale};
use crate::port::PortSpec;
use crate::transport::{Transport, TransportEvents};

/// Sample rate assumed until [`Sequencer::initialize`] is called
pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;

/// Block size assumed until [`Sequencer::initialize`] is called
pub const DEFAULT_BLOCK_SIZE: usize = 512;

/// Position within the sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepCursor {
    /// Index of the active step
    pub step: usize,
    /// Pulses of the active step already consumed
    pub pulse: u32,
}

impl StepCursor {
    pub fn reset(&mut self) {
        self.step = 0;
        self.pulse = 0;
    }
}

/// Find the next enabled step after `current`, scanning circularly
///
/// Returns the step and whether the scan wrapped past the last step, or
/// `None` when no step is enabled. The scan visits every step at most once,
/// so it terminates even with all steps disabled.
pub fn next_enabled_step<P: ParamSource + ?Sized>(
    params: &P,
    current: usize,
) -> Option<(usize, bool)> {
    let num_steps = params.num_steps();
    let mut step = current;
    let mut wrapped = false;
    for _ in 0..num_steps {
        step += 1;
        if step >= num_steps {
            step = 0;
            wrapped = true;
        }
        if params.step(step).enabled {
            return Some((step, wrapped));
        }
    }
    None
}

/// Mutable state owned exclusively by one engine
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    transport: Transport,
    cursor: StepCursor,
    timing: PulseTiming,
    gate: GateTimer,
    end_of_sequence_gate: GateTimer,
    current_step_pitch: f64,
    target_pitch: f64,
    current_pitch: f64,
}

impl EngineState {
    #[inline]
    pub fn current_step(&self) -> usize {
        self.cursor.step
    }

    #[inline]
    pub fn current_pulse(&self) -> u32 {
        self.cursor.pulse
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.transport.is_running()
    }

    #[inline]
    pub fn is_gate_open(&self) -> bool {
        self.gate.is_open()
    }

    #[inline]
    pub fn gate_length_samples(&self) -> f64 {
        self.gate.length_samples()
    }

    #[inline]
    pub fn is_end_of_sequence_open(&self) -> bool {
        self.end_of_sequence_gate.is_open()
    }

    #[inline]
    pub fn end_of_sequence_length_samples(&self) -> f64 {
        self.end_of_sequence_gate.length_samples()
    }

    /// Smoothed pitch
    #[inline]
    pub fn current_pitch(&self) -> f64 {
        self.current_pitch
    }

    /// Unsmoothed pitch the glide filter is heading for
    #[inline]
    pub fn target_pitch(&self) -> f64 {
        self.target_pitch
    }

    /// Normalized pitch latched from the active step
    #[inline]
    pub fn current_step_pitch(&self) -> f64 {
        self.current_step_pitch
    }

    /// Last measured clock interval, 0 before the first full interval
    #[inline]
    pub fn samples_per_pulse(&self) -> u32 {
        self.timing.samples_per_pulse()
    }
}

/// Control-voltage step sequencer
///
/// Reads its configuration through a [`ParamSource`] and publishes display
/// mirrors through a [`DisplaySink`]. Processing never allocates, locks or
/// logs; all state lives in [`EngineState`].
pub struct Sequencer<P: ParamSource, D: DisplaySink = ()> {
    params: P,
    display: D,
    state: EngineState,
    glide: GlideFilter,
    sample_rate: f64,
    max_block_size: usize,
}

impl<P: ParamSource, D: DisplaySink> Sequencer<P, D> {
    pub fn new(params: P, display: D) -> Self {
        let glide = GlideFilter::new(DEFAULT_SAMPLE_RATE, params.read_float(ParamId::Glide));
        let mut sequencer = Self {
            params,
            display,
            state: EngineState::default(),
            glide,
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_block_size: DEFAULT_BLOCK_SIZE,
        };
        sequencer.prepare(DEFAULT_SAMPLE_RATE, DEFAULT_BLOCK_SIZE);
        sequencer
    }

    /// Prepare for playback at a sample rate
    ///
    /// Resets the glide filter and its cutoff ramp. Step, pulse and gate
    /// state survive; only a reset edge clears those. A sample rate that is
    /// not finite and positive is rejected and leaves the engine untouched.
    pub fn initialize(
        &mut self,
        sample_rate: f64,
        max_block_size: usize,
    ) -> Result<(), ConfigError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            let err = ConfigError::SampleRateOutOfRange { sample_rate };
            log::warn!(target: "pulseq::engine", "rejected initialize: {}", err);
            return Err(err);
        }
        self.prepare(sample_rate, max_block_size);
        Ok(())
    }

    fn prepare(&mut self, sample_rate: f64, max_block_size: usize) {
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.glide
            .initialize(sample_rate, self.params.read_float(ParamId::Glide));

        log::debug!(
            target: "pulseq::engine",
            "initialized at {} Hz, max block {} samples, {} steps, glide cutoff {:.1} Hz",
            sample_rate,
            max_block_size,
            self.params.num_steps(),
            self.glide.cutoff_hz()
        );
    }

    /// Process `num_samples` samples of `buffer` in place
    ///
    /// Channels 0-3 carry clock, reset, start and stop in; channels 0-2
    /// receive trigger, pitch and end-of-sequence out. Each sample's inputs
    /// are read before its outputs are written.
    pub fn process<B: AudioBuffer + ?Sized>(&mut self, buffer: &mut B, num_samples: usize) {
        self.state
            .transport
            .apply_toggle(self.params.read_bool(ParamId::ToggleRunning));

        let frames = num_samples.min(buffer.num_samples());
        for index in 0..frames {
            let input = ControlFrame::read(buffer, index);
            self.tick(input).write(buffer, index);
        }

        self.display.show_running(self.state.is_running());
        self.display.show_step(self.state.current_step());
    }

    /// Produce one sample
    pub fn tick(&mut self, input: ControlFrame) -> OutputFrame {
        let levels = input.levels();
        let events = self.state.transport.update(levels);
        self.handle_transport(events);

        if events.triggered && self.params.any_step_enabled() {
            self.handle_clock_edge();
        }

        self.state.gate.tick();
        self.state.end_of_sequence_gate.tick();

        self.glide.update(self.params.read_float(ParamId::Glide));
        if self.state.gate.is_open() {
            self.update_pitch();
        }

        let running = self.state.is_running();
        let output = compose(
            self.state.gate.is_open(),
            self.state.current_pitch,
            self.state.end_of_sequence_gate.is_open(),
            running,
        );
        self.display.show_triggered(output.gate_high());
        self.display.show_end_of_sequence(output.end_of_sequence_high());

        self.state
            .transport
            .end_sample(levels.clock || events.triggered);
        self.state.timing.tick();

        output
    }

    fn handle_transport(&mut self, events: TransportEvents) {
        if events.reset {
            self.state.cursor.reset();
            if !self.params.step(0).enabled {
                if let Some((first, _)) = next_enabled_step(&self.params, 0) {
                    self.state.cursor.step = first;
                }
            }
            self.state.gate.close();
            self.state.end_of_sequence_gate.close();
        }
        if events.started {
            self.state.timing.resume();
        }
    }

    fn handle_clock_edge(&mut self) {
        self.state.timing.record_pulse();

        if !self.state.is_running() {
            return;
        }

        let num_steps = self.params.num_steps();
        debug_assert!(self.state.cursor.step < num_steps);
        if self.state.cursor.step >= num_steps {
            self.state.cursor.reset();
        }

        let step = self.params.step(self.state.cursor.step);
        if self.state.cursor.pulse >= step.pulse_count || !step.enabled {
            self.advance_step();
            if !self.state.is_running() {
                return;
            }
        }

        let step = self.params.step(self.state.cursor.step);
        if self.state.cursor.pulse == 0 || step.gate_mode.retriggers_each_pulse() {
            self.state.current_step_pitch = step.pitch;
            if step.gate_mode.opens_gate() {
                let length = gate_length(
                    step.gate_mode,
                    self.state.timing.interval(),
                    step.pulse_count,
                    self.params.read_float(ParamId::GateLength),
                );
                self.state.gate.open(length);
            } else {
                self.state.gate.close();
            }
        }

        self.state.cursor.pulse += 1;
    }

    fn advance_step(&mut self) {
        self.state.cursor.pulse = 0;

        // Callers have checked that a step is enabled, so the scan finds one.
        let Some((next, wrapped)) = next_enabled_step(&self.params, self.state.cursor.step) else {
            return;
        };
        self.state.cursor.step = next;

        if wrapped {
            self.handle_end_of_sequence();
        }
    }

    fn handle_end_of_sequence(&mut self) {
        if !self.state.end_of_sequence_gate.is_open() {
            self.state
                .end_of_sequence_gate
                .open(self.state.timing.interval());
        }

        if !self.params.read_bool(ParamId::Looping) {
            self.state.transport.stop();
        }
    }

    fn update_pitch(&mut self) {
        let extent = self.params.read_float(ParamId::PitchExtent);
        let root = self.params.read_int(ParamId::RootPitch);
        let scale = PitchScale::from_index(self.params.read_int(ParamId::PitchScale));

        self.state.target_pitch = quantize(self.state.current_step_pitch * extent, root, scale);
        self.state.current_pitch = self.glide.process(self.state.target_pitch);
    }

    /// Current engine state
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Bus layout the host must provide to [`Sequencer::process`]
    pub fn port_spec(&self) -> PortSpec {
        PortSpec::sequencer()
    }
}
