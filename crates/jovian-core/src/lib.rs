//! Jovian Core - DSP primitives for the jovian synthesizer
//!
//! This crate provides the signal-processing building blocks the synthesis
//! engine is assembled from. Everything here is allocation-free, fixed-size,
//! and safe to call from a real-time audio callback.
//!
//! # Core Abstractions
//!
//! ## Processing
//!
//! - [`Effect`] - Mono sample processor trait shared by the filters
//!
//! ## Parameter Smoothing
//!
//! Zipper-free parameter changes:
//!
//! - [`SmoothedParam`] - Exponential smoothing (RC-like response)
//!
//! ## Filters
//!
//! - [`StateVariableFilter`] - Resonant TPT SVF with LP12/LP24/HP12/BP12 modes
//! - [`OnePoleHighpass`] - 6 dB/oct highpass for bass cleanup
//!
//! ## Delay Lines
//!
//! - [`FixedDelayLine`] - Fixed-length delay (compile-time size) with fractional reads
//!
//! ## Modulation
//!
//! - [`Lfo`] - Low-frequency oscillator (4 waveforms) with delayed fade-in
//!
//! ## Parameter Metadata
//!
//! - [`ParamDescriptor`], [`ParamUnit`], [`ParamId`] - static parameter tables
//! - [`ParameterInfo`] - uniform indexed access to a parameter set
//!
//! ## Utilities
//!
//! - Math functions: [`soft_clip`], [`flush_denormal`], [`sanitize`], etc.
//! - Fast approximations: [`fast_exp2`], [`fast_tan`], [`fast_sin_turns`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible for embedded audio targets.
//! Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! jovian-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use jovian_core::{Effect, FilterMode, StateVariableFilter};
//!
//! let mut vcf = StateVariableFilter::new(48000.0);
//! vcf.set_mode(FilterMode::Lowpass24);
//! vcf.set_cutoff(1200.0);
//! vcf.set_resonance(0.4);
//!
//! let mut buffer = [0.5_f32; 64];
//! vcf.process_block_inplace(&mut buffer);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod delay;
pub mod effect;
pub mod fast_math;
pub mod lfo;
pub mod math;
pub mod one_pole;
pub mod param;
pub mod param_info;
pub mod svf;

// Re-export main types at crate root
pub use delay::FixedDelayLine;
pub use effect::Effect;
pub use fast_math::{fast_exp2, fast_sin_turns, fast_tan};
pub use lfo::{Lfo, LfoWaveform};
pub use math::{
    DENORMAL_BIAS, equal_power_pan, flush_denormal, ms_to_samples, sanitize, soft_clip,
};
pub use one_pole::OnePoleHighpass;
pub use param::SmoothedParam;
pub use param_info::{ParamDescriptor, ParamId, ParamUnit, ParameterInfo};
pub use svf::{FilterMode, StateVariableFilter};
