//! Jovian Synth - Polyphonic subtractive synthesis engine
//!
//! This crate assembles the [`jovian_core`] primitives into a six-voice
//! analog-style synthesizer: two oscillators per voice, a resonant
//! multi-mode filter, three envelopes, a shared LFO, a sixteen-slot
//! modulation hub and a stereo widener on the output.
//!
//! # Core Components
//!
//! ## Oscillators
//!
//! - [`Dco`] - PolyBLEP oscillator with saw, square, pulse, triangle, sine and noise
//! - [`DcoPair`] - DCO1/DCO2 with cross-modulation and hard/soft sync
//! - [`UnisonStack`] - Up to seven detuned pairs spread across stereo
//!
//! ## Envelopes
//!
//! - [`Envelope`] - Linear ADSR with click-free forced release
//!
//! ## Voices
//!
//! - [`Voice`] - One oscillator pair, high-pass, filter and envelopes
//! - [`VoiceAllocator`] - Mono / poly / unison note handling and stealing
//!
//! ## Control
//!
//! - [`Param`] - The 24 host parameters
//! - [`ModHub`] - Sixteen modulation targets behind two parameters
//! - [`Preset`] / [`factory_presets`] - Sound snapshots and the built-in bank
//!
//! ## The Instrument
//!
//! - [`SynthEngine`] - Parameters, notes, presets and block rendering
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible and never allocates. Disable the
//! default `std` feature:
//!
//! ```toml
//! [dependencies]
//! jovian-synth = { version = "0.1", default-features = false }
//! ```
//!
//! Enable `tracing` for debug events on init, preset loads, mode changes
//! and voice steals. Nothing is logged per sample.
//!
//! # Example
//!
//! ```rust
//! use jovian_synth::{MAX_FRAMES, SynthEngine};
//!
//! let mut synth = SynthEngine::new();
//! synth.init(48000.0);
//! synth.load_preset(3);
//!
//! synth.note_on(60, 100);
//! synth.note_on(64, 100);
//! synth.note_on(67, 100);
//!
//! let mut out = [0.0_f32; MAX_FRAMES * 2];
//! for _ in 0..100 {
//!     synth.render(&mut out, MAX_FRAMES);
//! }
//! assert!(out.iter().any(|s| s.abs() > 0.0));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod allocator;
pub mod engine;
pub mod envelope;
pub mod mod_hub;
pub mod oscillator;
pub mod output;
pub mod params;
pub mod presets;
pub mod render;
pub mod unison;
pub mod voice;

// Re-export main types at crate root
pub use allocator::{AllocationStrategy, NoteOnOutcome, NoteStack, SynthMode, VoiceAllocator};
pub use engine::{DEFAULT_SAMPLE_RATE, DEFAULT_UNISON_VOICES, MAX_FRAMES, NUM_VOICES, SynthEngine};
pub use envelope::{Envelope, EnvelopeState};
pub use mod_hub::{HubDestination, ModDestination, ModHub, NUM_DESTINATIONS, find_destination};
pub use oscillator::{Dco, DcoPair, DcoWaveform, PairMix, SyncMode};
pub use output::{EffectMode, OutputStage, WidenerSettings};
pub use params::{NUM_PARAMS, PARAMS, Param, find_param};
pub use presets::{FactoryPreset, NUM_FACTORY_PRESETS, Preset, factory_presets};
pub use render::{
    ModeRenderer, MonoRenderer, PolyRenderer, RenderSetup, SampleTick, UnisonRenderer,
};
pub use unison::{MAX_UNISON, UnisonStack};
pub use voice::{PendingNote, Voice, cents_to_ratio, midi_to_freq};
