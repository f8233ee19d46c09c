//! # Pulseq: Sample-Accurate Step Sequencer
//!
//! `pulseq` is a control-voltage step sequencer engine for modular synthesis
//! hosts. Each audio block it reads clock, reset, start and stop signals and
//! writes a gate, a pitch control voltage and an end-of-sequence pulse, with
//! every transition landing on the exact sample it belongs to.
//!
//! ## Architecture
//!
//! The engine is organized in three layers:
//!
//! - **Layer 1: Components** - Transport edge detection, gate timing, glide smoothing
//! - **Layer 2: Step Machine** - Pulse counting, step advancement, end-of-sequence handling
//! - **Layer 3: Host Bridge** - Parameter bank, display mirrors, in-place bus processing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pulseq::prelude::*;
//!
//! // Eight steps with default settings
//! let params = ParamBank::new(8).unwrap();
//! params.set(ParamId::Step(2, StepParam::Pitch), 0.75).unwrap();
//!
//! let mut sequencer = Sequencer::new(&params, ());
//! sequencer.initialize(48000.0, 256).unwrap();
//!
//! // Clock, reset, start and stop in; trigger, pitch and end-of-sequence out
//! let mut bus = ChannelBuffer::new(BUS_CHANNELS, 256);
//! bus.fill(START_INPUT, 1.0);
//! sequencer.process(&mut bus, 256);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod buffer;
pub mod gate;
pub mod glide;
pub mod io;
pub mod output;
pub mod params;
pub mod pitch;
pub mod port;
pub mod sequencer;
pub mod step;
pub mod transport;

/// Prelude module for convenient imports
pub mod prelude {
    // Layer 1: Components
    pub use crate::gate::{gate_length, GateTimer, PulseTiming, FALLBACK_PULSE_SAMPLES};
    pub use crate::glide::{cutoff_for_glide, GlideFilter, LinearRamp, OnePole};
    pub use crate::transport::{Transport, TransportEvents, TransportLevels};

    // Layer 2: Step Machine
    pub use crate::pitch::{quantize, PitchScale};
    pub use crate::sequencer::{next_enabled_step, EngineState, Sequencer, StepCursor};
    pub use crate::step::{GateMode, StepConfig};

    // Layer 3: Host Bridge
    pub use crate::buffer::{AudioBuffer, ChannelBuffer};
    pub use crate::io::{AtomicF64, DisplayState, ParamBank};
    pub use crate::output::{compose, ControlFrame, OutputFrame};
    pub use crate::params::{
        ConfigError, DisplaySink, ParamDescriptor, ParamId, ParamKind, ParamSource,
        SequenceConfig, StepParam, MAX_STEPS,
    };
    pub use crate::port::{
        PortDef, PortId, PortSpec, SignalKind, BUS_CHANNELS, CLOCK_INPUT,
        END_OF_SEQUENCE_OUTPUT, PITCH_OUTPUT, RESET_INPUT, START_INPUT, STOP_INPUT,
        TRIGGER_OUTPUT,
    };
}

// Re-export key types at crate root for convenience
pub use prelude::*;
