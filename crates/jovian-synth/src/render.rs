//! Per-buffer setup and the per-mode render loops.
//!
//! [`RenderSetup`] is built once per buffer from the parameter table and
//! the modulation hub, so everything expensive (exponentials, table
//! lookups) happens outside the sample loop. [`SampleTick`] carries the few
//! values that move every sample: the LFO and the smoothed controls.
//!
//! Each [`SynthMode`](crate::SynthMode) has its own [`ModeRenderer`]; the
//! engine matches on the mode once and calls [`render_block`], which is
//! monomorphized per renderer.

use crate::mod_hub::{ModDestination, ModHub};
use crate::oscillator::{DcoWaveform, PairMix, SyncMode};
use crate::params::{NUM_PARAMS, Param, cutoff_hz, dco2_tune_cents, octave_multiplier};
use crate::unison::UnisonStack;
use crate::voice::{Voice, cents_to_ratio};
use jovian_core::{FilterMode, OnePoleHighpass, SmoothedParam};
use libm::{exp2f, sqrtf};

/// Longest glide, in seconds per octave.
pub const MAX_GLIDE_S: f32 = 2.0;

/// Per-buffer snapshot of every constant the voices read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSetup {
    /// DCO1 footage multiplier.
    pub dco1_mult: f32,
    /// DCO2 footage multiplier times fine tune.
    pub dco2_ratio: f32,
    /// DCO1 waveform.
    pub dco1_wave: DcoWaveform,
    /// DCO2 waveform.
    pub dco2_wave: DcoWaveform,
    /// Base pulse width (0..1).
    pub pulse_width: f32,
    /// LFO to pulse width depth.
    pub lfo_pwm_depth: f32,
    /// Filter envelope to pulse width depth.
    pub env_pwm_depth: f32,
    /// Cross-mod depth in octaves per unit of DCO2.
    pub xmod: f32,
    /// Oscillator sync.
    pub sync: SyncMode,
    /// Target base cutoff in Hz (smoothed by the engine).
    pub cutoff_hz: f32,
    /// Target DCO2 level (smoothed by the engine).
    pub osc_mix: f32,
    /// Filter resonance (0..1).
    pub resonance: f32,
    /// Filter response.
    pub filter_mode: FilterMode,
    /// Octaves of cutoff per octave of key.
    pub key_track: f32,
    /// Filter envelope depth in octaves.
    pub env_vcf_depth: f32,
    /// LFO to cutoff depth in octaves.
    pub lfo_vcf_depth: f32,
    /// Vibrato depth in semitones.
    pub lfo_vco_depth: f32,
    /// Pitch envelope depth in semitones.
    pub env_pitch_depth: f32,
    /// Whether the per-voice high-pass runs.
    pub hpf_enabled: bool,
    /// High-pass pole coefficient.
    pub hpf_coeff: f32,
    /// Target output level (smoothed by the engine).
    pub vca_level: f32,
    /// LFO to amplitude depth (0..1).
    pub tremolo: f32,
    /// Amplitude key tracking (0..1).
    pub vca_key_track: f32,
    /// Unison detune spread in cents.
    pub unison_detune: f32,
}

impl Default for RenderSetup {
    fn default() -> Self {
        Self {
            dco1_mult: 1.0,
            dco2_ratio: 1.0,
            dco1_wave: DcoWaveform::Saw,
            dco2_wave: DcoWaveform::Saw,
            pulse_width: 0.5,
            lfo_pwm_depth: 0.0,
            env_pwm_depth: 0.0,
            xmod: 0.0,
            sync: SyncMode::Off,
            cutoff_hz: 1000.0,
            osc_mix: 0.0,
            resonance: 0.0,
            filter_mode: FilterMode::Lowpass12,
            key_track: 0.0,
            env_vcf_depth: 2.0,
            lfo_vcf_depth: 0.0,
            lfo_vco_depth: 0.0,
            env_pitch_depth: 0.0,
            hpf_enabled: false,
            hpf_coeff: 1.0,
            vca_level: 1.0,
            tremolo: 0.0,
            vca_key_track: 0.0,
            unison_detune: 0.0,
        }
    }
}

fn norm(params: &[i32; NUM_PARAMS], param: Param) -> f32 {
    param.descriptor().normalize(params[param.index()])
}

/// High-pass corner for a hub HPF amount (0..1): 20 Hz to 2 kHz, exponential.
pub fn hpf_frequency(amount: f32) -> f32 {
    20.0 * exp2f(amount.clamp(0.0, 1.0) * 6.643_856)
}

/// Glide rate in octaves per sample for the hub portamento value.
///
/// Glide time grows quadratically up to [`MAX_GLIDE_S`] per octave; zero
/// means no glide.
pub fn glide_rate(hub: &ModHub, sample_rate: f32) -> f32 {
    let n = hub.normalized_unipolar(ModDestination::Portamento);
    let seconds = n * n * MAX_GLIDE_S;
    if seconds > 0.0 {
        1.0 / (seconds * sample_rate)
    } else {
        0.0
    }
}

impl RenderSetup {
    /// Snapshot `params` and `hub` for one buffer.
    pub fn build(params: &[i32; NUM_PARAMS], hub: &ModHub, sample_rate: f32) -> Self {
        use ModDestination as D;

        let hpf_amount = hub.normalized_unipolar(D::Hpf);
        Self {
            dco1_mult: octave_multiplier(params[Param::Dco1Octave.index()]),
            dco2_ratio: octave_multiplier(params[Param::Dco2Octave.index()])
                * cents_to_ratio(dco2_tune_cents(params[Param::Dco2Tune.index()])),
            dco1_wave: DcoWaveform::dco1_from_index(params[Param::Dco1Wave.index()]),
            dco2_wave: DcoWaveform::dco2_from_index(params[Param::Dco2Wave.index()]),
            pulse_width: norm(params, Param::Dco1PulseWidth),
            lfo_pwm_depth: hub.normalized_unipolar(D::LfoToPwm) * 0.4,
            env_pwm_depth: hub.normalized_unipolar(D::EnvToPwm) * 0.4,
            xmod: norm(params, Param::CrossMod) * 0.5,
            sync: SyncMode::from_index(params[Param::Sync.index()]),
            cutoff_hz: cutoff_hz(norm(params, Param::Cutoff)),
            osc_mix: norm(params, Param::OscMix),
            resonance: norm(params, Param::Resonance),
            filter_mode: FilterMode::from_index(hub.value(D::VcfType)),
            key_track: norm(params, Param::KeyFollow),
            env_vcf_depth: 2.0 + hub.normalized_bipolar(D::EnvToVcf) * 2.0,
            lfo_vcf_depth: hub.normalized_unipolar(D::LfoToVcf),
            lfo_vco_depth: hub.normalized_unipolar(D::LfoToVco),
            env_pitch_depth: hub.value(D::EnvToPitch) as f32,
            hpf_enabled: hpf_amount > 0.0,
            hpf_coeff: OnePoleHighpass::coefficient_for(hpf_frequency(hpf_amount), sample_rate),
            vca_level: hub.normalized_unipolar(D::VcaLevel),
            tremolo: hub.normalized_unipolar(D::Tremolo),
            vca_key_track: hub.normalized_unipolar(D::VcaKeyTrack),
            unison_detune: hub.value(D::UnisonDetune) as f32,
        }
    }

    /// Oscillator pair settings for one sample.
    #[inline]
    pub fn pair_mix(&self, tick: &SampleTick) -> PairMix {
        PairMix {
            level1: 1.0 - tick.osc_mix,
            level2: tick.osc_mix,
            xmod: self.xmod,
            sync: self.sync,
        }
    }
}

/// Values that change every sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleTick {
    /// Shared LFO output (-1..1, faded).
    pub lfo: f32,
    /// Smoothed base cutoff in Hz.
    pub cutoff_hz: f32,
    /// Smoothed DCO2 level (0..1).
    pub osc_mix: f32,
    /// Output gain: level, tremolo and headroom.
    pub vca_gain: f32,
    /// Smoothed pressure in octaves of cutoff.
    pub pressure: f32,
    /// Smoothed pitch bend in semitones.
    pub bend: f32,
}

impl Default for SampleTick {
    fn default() -> Self {
        Self {
            lfo: 0.0,
            cutoff_hz: 1000.0,
            osc_mix: 0.0,
            vca_gain: 1.0,
            pressure: 0.0,
            bend: 0.0,
        }
    }
}

/// Sample loop for one voice mode.
pub trait ModeRenderer {
    /// Apply per-buffer settings.
    fn prepare(&mut self, voices: &mut [Voice], setup: &RenderSetup);

    /// Produce one mono sample.
    fn render_sample(&mut self, voices: &mut [Voice], setup: &RenderSetup, tick: &SampleTick) -> f32;
}

/// Render `ticks.len()` samples (at most `out.len()`) with `renderer`.
pub fn render_block<R: ModeRenderer>(
    renderer: &mut R,
    voices: &mut [Voice],
    setup: &RenderSetup,
    ticks: &[SampleTick],
    out: &mut [f32],
) {
    renderer.prepare(voices, setup);
    for (sample, tick) in out.iter_mut().zip(ticks) {
        *sample = renderer.render_sample(voices, setup, tick);
    }
}

/// Run one voice through its own oscillator pair and the shared chain.
#[inline]
fn render_voice(voice: &mut Voice, setup: &RenderSetup, tick: &SampleTick) -> f32 {
    let freq = voice.tick_pitch(setup, tick);
    voice
        .osc
        .set_frequencies(freq * setup.dco1_mult, freq * setup.dco2_ratio);
    let pw = voice.pulse_width(setup, tick);
    voice.osc.dco1.set_pulse_width(pw);
    voice.osc.dco2.set_pulse_width(pw);
    let s = voice.osc.process(&setup.pair_mix(tick));
    voice.tick_output(setup, tick, s)
}

/// Voice 0 only.
#[derive(Debug, Clone, Default)]
pub struct MonoRenderer;

impl ModeRenderer for MonoRenderer {
    fn prepare(&mut self, voices: &mut [Voice], setup: &RenderSetup) {
        if let Some(voice) = voices.first_mut() {
            voice.prepare(setup);
        }
    }

    #[inline]
    fn render_sample(&mut self, voices: &mut [Voice], setup: &RenderSetup, tick: &SampleTick) -> f32 {
        match voices.first_mut() {
            Some(voice) if voice.is_sounding() => render_voice(voice, setup, tick),
            _ => 0.0,
        }
    }
}

/// Every sounding voice, mixed at `1/sqrt(active)`.
///
/// The mix gain glides over a few milliseconds when the active count
/// changes so existing voices don't step in level.
#[derive(Debug, Clone)]
pub struct PolyRenderer {
    gain: SmoothedParam,
    active: usize,
}

impl PolyRenderer {
    /// Create a renderer at `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            gain: SmoothedParam::with_config(1.0, sample_rate, 5.0),
            active: 0,
        }
    }

    /// Update the gain smoothing rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.gain.set_sample_rate(sample_rate);
    }

    /// Voices mixed in the last sample.
    pub fn active(&self) -> usize {
        self.active
    }

    /// Snap the mix gain back to unity.
    pub fn reset(&mut self) {
        self.gain.set_immediate(1.0);
        self.active = 0;
    }
}

impl ModeRenderer for PolyRenderer {
    fn prepare(&mut self, voices: &mut [Voice], setup: &RenderSetup) {
        for voice in voices.iter_mut() {
            voice.prepare(setup);
        }
    }

    #[inline]
    fn render_sample(&mut self, voices: &mut [Voice], setup: &RenderSetup, tick: &SampleTick) -> f32 {
        let mut mixed = 0.0;
        let mut active = 0;
        for voice in voices.iter_mut().filter(|v| v.is_sounding()) {
            mixed += render_voice(voice, setup, tick);
            active += 1;
        }
        if active != self.active {
            self.active = active;
            if active > 0 {
                self.gain.set_target(1.0 / sqrtf(active as f32));
            }
        }
        mixed * self.gain.advance()
    }
}

/// Voice 0's pitch and chain driving a detuned [`UnisonStack`], collapsed
/// to mono ahead of the filter.
#[derive(Debug, Clone)]
pub struct UnisonRenderer {
    /// Oscillator copies.
    pub stack: UnisonStack,
    voices: usize,
}

impl UnisonRenderer {
    /// Create a renderer with `voices` copies.
    pub fn new(sample_rate: f32, voices: usize) -> Self {
        let mut stack = UnisonStack::new(sample_rate);
        stack.set_count(voices);
        Self {
            stack,
            voices: voices.clamp(1, crate::unison::MAX_UNISON),
        }
    }

    /// Set the number of copies (1..=7).
    pub fn set_voices(&mut self, voices: usize) {
        self.voices = voices.clamp(1, crate::unison::MAX_UNISON);
    }

    /// Number of copies.
    pub fn voices(&self) -> usize {
        self.voices
    }

    /// Update the oscillator sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.stack.set_sample_rate(sample_rate);
    }
}

impl ModeRenderer for UnisonRenderer {
    fn prepare(&mut self, voices: &mut [Voice], setup: &RenderSetup) {
        self.stack.set_count(self.voices);
        self.stack.set_detune_cents(setup.unison_detune);
        self.stack.set_waveforms(setup.dco1_wave, setup.dco2_wave);
        if let Some(voice) = voices.first_mut() {
            voice.prepare(setup);
        }
    }

    #[inline]
    fn render_sample(&mut self, voices: &mut [Voice], setup: &RenderSetup, tick: &SampleTick) -> f32 {
        let Some(voice) = voices.first_mut() else {
            return 0.0;
        };
        if !voice.is_sounding() {
            return 0.0;
        }
        let freq = voice.tick_pitch(setup, tick);
        self.stack
            .set_frequencies(freq * setup.dco1_mult, freq * setup.dco2_ratio);
        let pw = voice.pulse_width(setup, tick);
        self.stack.set_pulse_widths(pw, pw);
        let (left, right) = self.stack.process(&setup.pair_mix(tick));
        voice.tick_output(setup, tick, (left + right) * 0.5)
    }
}
