//! One synthesizer voice and its per-sample signal chain.
//!
//! A voice owns an oscillator pair, a high-pass, the resonant filter and
//! three envelopes (amplitude, filter, pitch). Pitch is held in log2(Hz) so
//! glide moves at a constant musical rate.
//!
//! The renderers split the chain in two: [`Voice::tick_pitch`] yields the
//! base frequency for whichever oscillators the mode uses, and
//! [`Voice::tick_output`] filters and amplifies the oscillator signal.

use crate::envelope::Envelope;
use crate::oscillator::DcoPair;
use crate::render::{RenderSetup, SampleTick};
use jovian_core::{Effect, OnePoleHighpass, StateVariableFilter, fast_exp2};
use libm::exp2f;

/// log2 of A4 (440 Hz).
const LOG2_A4: f32 = 8.781_360;

/// Convert a MIDI note number to frequency in Hz (A4 = 440 Hz).
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * exp2f((f32::from(note) - 69.0) / 12.0)
}

/// log2 of the frequency of `note`.
#[inline]
pub fn midi_to_log2_freq(note: u8) -> f32 {
    LOG2_A4 + (f32::from(note) - 69.0) / 12.0
}

/// Convert cents to a frequency ratio.
#[inline]
pub fn cents_to_ratio(cents: f32) -> f32 {
    exp2f(cents / 1200.0)
}

/// Note waiting for a stolen voice to finish its fade-out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingNote {
    /// MIDI note.
    pub note: u8,
    /// Velocity, 0.0 to 1.0.
    pub velocity: f32,
    /// Age stamp the note was allocated with.
    pub age: u64,
    /// Glide rate in octaves per sample.
    pub glide_rate: f32,
}

/// A single synthesizer voice.
///
/// # Example
///
/// ```rust
/// use jovian_synth::Voice;
///
/// let mut voice = Voice::new(48000.0);
/// voice.start(60, 0.8, 1, 0.0, true);
/// assert!(voice.is_sounding());
/// assert_eq!(voice.note(), 60);
///
/// voice.release();
/// assert!(!voice.is_gated());
/// ```
#[derive(Debug, Clone)]
pub struct Voice {
    /// Oscillator pair (mono and poly modes).
    pub osc: DcoPair,
    /// Resonant filter.
    pub vcf: StateVariableFilter,
    /// High-pass ahead of the filter.
    pub hpf: OnePoleHighpass,
    /// Amplitude envelope.
    pub amp_env: Envelope,
    /// Filter envelope.
    pub filter_env: Envelope,
    /// Pitch envelope, following the filter envelope settings.
    pub pitch_env: Envelope,

    note: u8,
    velocity: f32,
    age: u64,
    gate: bool,

    pitch_log2: f32,
    target_log2: f32,
    glide_rate: f32,
    has_pitch: bool,

    pending: Option<PendingNote>,
}

impl Voice {
    /// Create an idle voice.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            osc: DcoPair::new(sample_rate),
            vcf: StateVariableFilter::new(sample_rate),
            hpf: OnePoleHighpass::new(sample_rate, 20.0),
            amp_env: Envelope::new(sample_rate),
            filter_env: Envelope::new(sample_rate),
            pitch_env: Envelope::new(sample_rate),
            note: 0,
            velocity: 0.0,
            age: 0,
            gate: false,
            pitch_log2: midi_to_log2_freq(60),
            target_log2: midi_to_log2_freq(60),
            glide_rate: 0.0,
            has_pitch: false,
            pending: None,
        }
    }

    /// Update the sample rate of every component.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.osc.set_sample_rate(sample_rate);
        self.vcf.set_sample_rate(sample_rate);
        self.hpf.set_sample_rate(sample_rate);
        self.amp_env.set_sample_rate(sample_rate);
        self.filter_env.set_sample_rate(sample_rate);
        self.pitch_env.set_sample_rate(sample_rate);
    }

    /// Silence the voice and clear all state.
    pub fn reset(&mut self) {
        self.osc.reset();
        self.vcf.reset();
        self.hpf.reset();
        self.amp_env.reset();
        self.filter_env.reset();
        self.pitch_env.reset();
        self.gate = false;
        self.glide_rate = 0.0;
        self.has_pitch = false;
        self.pending = None;
    }

    /// Start `note`.
    ///
    /// With `glide_rate > 0` the pitch slides from wherever the voice last
    /// was; otherwise it jumps. `retrigger` restarts all envelopes from
    /// their current level.
    pub fn start(&mut self, note: u8, velocity: f32, age: u64, glide_rate: f32, retrigger: bool) {
        self.note = note;
        self.velocity = velocity.clamp(0.0, 1.0);
        self.age = age;
        self.gate = true;
        self.pending = None;
        self.set_pitch_target(note, glide_rate);
        if retrigger {
            self.amp_env.note_on();
            self.filter_env.note_on();
            self.pitch_env.note_on();
        }
    }

    /// Move to `note` without touching the envelopes (legato).
    pub fn glide_to(&mut self, note: u8, glide_rate: f32) {
        self.note = note;
        self.set_pitch_target(note, glide_rate);
    }

    /// Enter release.
    pub fn release(&mut self) {
        self.gate = false;
        self.pending = None;
        self.amp_env.note_off();
        self.filter_env.note_off();
        self.pitch_env.note_off();
    }

    /// Fade out over `fade_ms` and then start `pending`.
    pub fn steal(&mut self, pending: PendingNote, fade_ms: f32) {
        self.gate = true;
        self.age = pending.age;
        self.amp_env.force_release(fade_ms);
        if self.amp_env.is_active() {
            self.pending = Some(pending);
        } else {
            self.start(pending.note, pending.velocity, pending.age, pending.glide_rate, true);
        }
    }

    fn set_pitch_target(&mut self, note: u8, glide_rate: f32) {
        self.target_log2 = midi_to_log2_freq(note);
        if glide_rate > 0.0 && self.has_pitch {
            self.glide_rate = glide_rate;
        } else {
            self.pitch_log2 = self.target_log2;
            self.glide_rate = 0.0;
        }
        self.has_pitch = true;
    }

    /// Note the voice is playing, or will play once a steal completes.
    pub fn held_note(&self) -> u8 {
        self.pending.map_or(self.note, |p| p.note)
    }

    /// Note currently sounding.
    pub fn note(&self) -> u8 {
        self.note
    }

    /// Velocity (0.0 to 1.0).
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Allocation age stamp.
    pub fn age(&self) -> u64 {
        self.age
    }

    /// True while a key holds the voice.
    pub fn is_gated(&self) -> bool {
        self.gate
    }

    /// True while the voice produces sound or waits to.
    pub fn is_sounding(&self) -> bool {
        self.amp_env.is_active() || self.pending.is_some()
    }

    /// True after note-off while the release is still sounding.
    pub fn is_releasing(&self) -> bool {
        !self.gate && self.amp_env.is_active()
    }

    /// Note parked behind a steal fade.
    pub fn pending(&self) -> Option<PendingNote> {
        self.pending
    }

    /// Current pitch in Hz, before modulation.
    pub fn pitch_hz(&self) -> f32 {
        exp2f(self.pitch_log2)
    }

    /// True while gliding toward the target pitch.
    pub fn is_gliding(&self) -> bool {
        self.pitch_log2 != self.target_log2
    }

    /// Apply the per-buffer filter and oscillator settings.
    pub fn prepare(&mut self, setup: &RenderSetup) {
        self.vcf.set_resonance(setup.resonance);
        self.vcf.set_mode(setup.filter_mode);
        if setup.hpf_enabled {
            self.hpf.set_coefficient(setup.hpf_coeff);
        }
        self.osc.dco1.set_waveform(setup.dco1_wave);
        self.osc.dco2.set_waveform(setup.dco2_wave);
    }

    /// Advance glide and the pitch envelope; return the modulated base
    /// frequency in Hz.
    #[inline]
    pub fn tick_pitch(&mut self, setup: &RenderSetup, tick: &SampleTick) -> f32 {
        if self.pitch_log2 != self.target_log2 {
            let delta = self.target_log2 - self.pitch_log2;
            if delta.abs() <= self.glide_rate {
                self.pitch_log2 = self.target_log2;
            } else {
                self.pitch_log2 += self.glide_rate.copysign(delta);
            }
        }
        let env = self.pitch_env.advance();
        let semitones =
            tick.bend + tick.lfo * setup.lfo_vco_depth + env * setup.env_pitch_depth;
        fast_exp2(self.pitch_log2 + semitones * (1.0 / 12.0))
    }

    /// Pulse width for this sample, from the shared base plus LFO and
    /// filter-envelope modulation.
    #[inline]
    pub fn pulse_width(&self, setup: &RenderSetup, tick: &SampleTick) -> f32 {
        setup.pulse_width
            + tick.lfo * setup.lfo_pwm_depth
            + self.filter_env.level() * setup.env_pwm_depth
    }

    /// High-pass, filter and amplify one oscillator sample.
    ///
    /// Completes a pending steal once the fade reaches silence.
    #[inline]
    pub fn tick_output(&mut self, setup: &RenderSetup, tick: &SampleTick, input: f32) -> f32 {
        let fenv = self.filter_env.advance();

        let x = if setup.hpf_enabled {
            self.hpf.process(input)
        } else {
            input
        };

        let note_octaves = (f32::from(self.note) - 60.0) / 12.0;
        let tracking = (note_octaves * setup.key_track).clamp(-4.0, 4.0);
        let modulation = (fenv * setup.env_vcf_depth
            + tick.lfo * setup.lfo_vcf_depth
            + self.velocity
            + tick.pressure)
            .clamp(-3.0, 3.0);
        self.vcf
            .set_cutoff(tick.cutoff_hz * fast_exp2(tracking + modulation));
        let y = self.vcf.process(x);

        let amp = self.amp_env.advance();
        let key_gain = fast_exp2((-note_octaves * setup.vca_key_track).clamp(-1.0, 1.0));
        let out = y * amp * (0.2 + 0.8 * self.velocity) * key_gain * tick.vca_gain;

        if !self.amp_env.is_active() {
            if let Some(p) = self.pending.take() {
                self.start(p.note, p.velocity, p.age, p.glide_rate, true);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    #[test]
    fn test_midi_to_freq() {
        assert!((midi_to_freq(69) - 440.0).abs() < 0.01);
        assert!((midi_to_freq(57) - 220.0).abs() < 0.01);
        assert!((midi_to_freq(60) - 261.63).abs() < 0.01);
        assert!((exp2f(midi_to_log2_freq(60)) - midi_to_freq(60)).abs() < 0.01);
        assert!((cents_to_ratio(1200.0) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_voice_start_jumps_without_glide() {
        let mut voice = Voice::new(SR);
        voice.start(60, 1.0, 1, 0.0, true);
        voice.start(72, 1.0, 2, 0.0, true);
        assert!(!voice.is_gliding());
        assert!((voice.pitch_hz() - midi_to_freq(72)).abs() < 0.05);
    }

    #[test]
    fn test_first_note_never_glides() {
        let mut voice = Voice::new(SR);
        voice.start(48, 1.0, 1, 0.001, true);
        assert!(!voice.is_gliding());
    }

    #[test]
    fn test_glide_constant_rate() {
        let setup = RenderSetup::default();
        let tick = SampleTick::default();
        let mut voice = Voice::new(SR);
        voice.start(48, 1.0, 1, 0.0, true);
        let rate = 1.0 / (0.1 * SR);
        voice.glide_to(60, rate);

        // One octave at 0.1 s per octave
        let samples = (0.1 * SR) as usize;
        for _ in 0..samples / 2 {
            voice.tick_pitch(&setup, &tick);
        }
        let halfway = voice.pitch_hz();
        let expected = midi_to_freq(48) * core::f32::consts::SQRT_2;
        assert!((halfway - expected).abs() / expected < 0.01, "{halfway} vs {expected}");

        for _ in 0..samples {
            voice.tick_pitch(&setup, &tick);
        }
        assert!(!voice.is_gliding());
        assert!((voice.pitch_hz() - midi_to_freq(60)).abs() < 0.05);
    }

    #[test]
    fn test_release_and_idle() {
        let setup = RenderSetup::default();
        let tick = SampleTick::default();
        let mut voice = Voice::new(SR);
        voice.amp_env.set_release_s(0.01);
        voice.start(60, 1.0, 1, 0.0, true);
        for _ in 0..1000 {
            voice.tick_output(&setup, &tick, 0.5);
        }
        voice.release();
        assert!(voice.is_releasing());
        for _ in 0..2000 {
            voice.tick_output(&setup, &tick, 0.5);
        }
        assert!(!voice.is_sounding());
    }

    #[test]
    fn test_steal_hands_off_after_fade() {
        let setup = RenderSetup::default();
        let tick = SampleTick::default();
        let mut voice = Voice::new(SR);
        voice.start(60, 1.0, 1, 0.0, true);
        for _ in 0..4800 {
            voice.tick_output(&setup, &tick, 0.5);
        }
        let pending = PendingNote {
            note: 64,
            velocity: 0.5,
            age: 2,
            glide_rate: 0.0,
        };
        voice.steal(pending, 5.0);
        assert_eq!(voice.held_note(), 64);
        assert_eq!(voice.note(), 60);

        // 5 ms fade plus margin
        for _ in 0..300 {
            voice.tick_output(&setup, &tick, 0.5);
        }
        assert_eq!(voice.note(), 64);
        assert!(voice.pending().is_none());
        assert!(voice.amp_env.is_active());
        assert!((voice.velocity() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_steal_of_silent_voice_starts_at_once() {
        let mut voice = Voice::new(SR);
        let pending = PendingNote {
            note: 50,
            velocity: 1.0,
            age: 3,
            glide_rate: 0.0,
        };
        voice.steal(pending, 5.0);
        assert_eq!(voice.note(), 50);
        assert!(voice.pending().is_none());
    }

    #[test]
    fn test_output_finite_and_bounded() {
        let mut setup = RenderSetup::default();
        setup.hpf_enabled = true;
        let tick = SampleTick::default();
        let mut voice = Voice::new(SR);
        voice.start(30, 1.0, 1, 0.0, true);
        for i in 0..20_000 {
            let x = if i % 100 < 50 { 1.0 } else { -1.0 };
            let y = voice.tick_output(&setup, &tick, x);
            assert!(y.is_finite() && y.abs() < 4.0, "{y}");
        }
    }
}
