//! Linear ADSR envelope generator.
//!
//! Drives the amplitude, the filter cutoff and the auxiliary pitch
//! modulation of each voice. Segments are straight lines whose slopes are
//! defined against full scale: an attack of 100 ms takes 100 ms from 0 to
//! 1, a decay of 100 ms would take 100 ms from 1 to 0 (so it reaches a
//! sustain of 0.5 in 50 ms).
//!
//! Time controls arrive as 0..=100 and go through a quadratic curve,
//! `t = 0.001 + (n/100)² · 4.999` seconds, which spends most of the travel
//! on short times. No ramp is shorter than [`MIN_RAMP_SAMPLES`].

/// Shortest ramp in samples, whatever the time setting.
pub const MIN_RAMP_SAMPLES: f32 = 4.0;
/// Shortest segment time in seconds.
pub const MIN_TIME_S: f32 = 0.001;
/// Longest segment time in seconds.
pub const MAX_TIME_S: f32 = 5.0;
/// Release time used when a voice is stolen.
pub const DEFAULT_FORCE_RELEASE_MS: f32 = 5.0;

/// Map a 0..=100 time control to seconds.
#[inline]
pub fn control_to_seconds(value: f32) -> f32 {
    let n = value.clamp(0.0, 100.0) / 100.0;
    MIN_TIME_S + n * n * (MAX_TIME_S - MIN_TIME_S)
}

/// ADSR envelope states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Inactive, output is zero.
    #[default]
    Idle,
    /// Rising toward 1.0.
    Attack,
    /// Falling toward the sustain level.
    Decay,
    /// Holding the sustain level.
    Sustain,
    /// Falling toward zero.
    Release,
}

/// Linear ADSR envelope.
///
/// # Example
///
/// ```rust
/// use jovian_synth::{Envelope, EnvelopeState};
///
/// let mut env = Envelope::new(48000.0);
/// env.set_attack(10.0);
/// env.set_sustain(60.0);
///
/// env.note_on();
/// let first = env.advance();
/// assert!(first > 0.0 && first < 0.1);
///
/// env.note_off();
/// assert_eq!(env.state(), EnvelopeState::Release);
/// ```
#[derive(Debug, Clone)]
pub struct Envelope {
    state: EnvelopeState,
    level: f32,
    sample_rate: f32,

    attack_s: f32,
    decay_s: f32,
    release_s: f32,
    sustain: f32,

    // Per-sample level deltas
    attack_rate: f32,
    decay_rate: f32,
    release_rate: f32,
    /// Slope of the release in progress (normal or forced)
    active_release_rate: f32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Envelope {
    /// Create an idle envelope: 1 ms attack, 100 ms decay, 0.7 sustain,
    /// 50 ms release.
    pub fn new(sample_rate: f32) -> Self {
        let mut env = Self {
            state: EnvelopeState::Idle,
            level: 0.0,
            sample_rate,
            attack_s: 0.001,
            decay_s: 0.1,
            release_s: 0.05,
            sustain: 0.7,
            attack_rate: 0.0,
            decay_rate: 0.0,
            release_rate: 0.0,
            active_release_rate: 0.0,
        };
        env.update_rates();
        env
    }

    /// Set attack from a 0..=100 control.
    pub fn set_attack(&mut self, value: f32) {
        self.set_attack_s(control_to_seconds(value));
    }

    /// Set decay from a 0..=100 control.
    pub fn set_decay(&mut self, value: f32) {
        self.set_decay_s(control_to_seconds(value));
    }

    /// Set release from a 0..=100 control.
    pub fn set_release(&mut self, value: f32) {
        self.set_release_s(control_to_seconds(value));
    }

    /// Set sustain from a 0..=100 control.
    pub fn set_sustain(&mut self, value: f32) {
        self.sustain = (value / 100.0).clamp(0.0, 1.0);
    }

    /// Set attack time in seconds.
    pub fn set_attack_s(&mut self, seconds: f32) {
        self.attack_s = seconds.clamp(MIN_TIME_S, MAX_TIME_S);
        self.attack_rate = self.rate_for(self.attack_s);
    }

    /// Set decay time in seconds.
    pub fn set_decay_s(&mut self, seconds: f32) {
        self.decay_s = seconds.clamp(MIN_TIME_S, MAX_TIME_S);
        self.decay_rate = self.rate_for(self.decay_s);
    }

    /// Set release time in seconds. A normal release in progress follows
    /// the new slope; a forced one does not.
    pub fn set_release_s(&mut self, seconds: f32) {
        let following = self.active_release_rate == self.release_rate;
        self.release_s = seconds.clamp(MIN_TIME_S, MAX_TIME_S);
        self.release_rate = self.rate_for(self.release_s);
        if following {
            self.active_release_rate = self.release_rate;
        }
    }

    /// Attack time in seconds.
    pub fn attack_s(&self) -> f32 {
        self.attack_s
    }

    /// Decay time in seconds.
    pub fn decay_s(&self) -> f32 {
        self.decay_s
    }

    /// Release time in seconds.
    pub fn release_s(&self) -> f32 {
        self.release_s
    }

    /// Sustain level (0.0 to 1.0).
    pub fn sustain(&self) -> f32 {
        self.sustain
    }

    /// Update the sample rate, keeping segment times.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_rates();
    }

    /// Start (or restart) the attack from the current level.
    pub fn note_on(&mut self) {
        self.state = EnvelopeState::Attack;
    }

    /// Release from the current level.
    pub fn note_off(&mut self) {
        if self.state != EnvelopeState::Idle {
            self.state = EnvelopeState::Release;
            self.active_release_rate = self.release_rate;
        }
    }

    /// Release over `ms` milliseconds from full scale, regardless of the
    /// release setting. Used to fade out a stolen voice.
    pub fn force_release(&mut self, ms: f32) {
        if self.state != EnvelopeState::Idle {
            self.state = EnvelopeState::Release;
            self.active_release_rate = self.rate_for(ms * 0.001);
        }
    }

    /// Jump to idle at zero.
    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.level = 0.0;
        self.active_release_rate = self.release_rate;
    }

    /// Current state.
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Current level without advancing.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// True unless idle.
    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    /// True while releasing (normal or forced).
    pub fn is_releasing(&self) -> bool {
        self.state == EnvelopeState::Release
    }

    /// Advance one sample and return the level (0.0 to 1.0).
    #[inline]
    pub fn advance(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }
            EnvelopeState::Attack => {
                self.level += self.attack_rate;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.state = EnvelopeState::Decay;
                }
            }
            EnvelopeState::Decay => {
                self.level -= self.decay_rate;
                if self.level <= self.sustain {
                    self.level = self.sustain;
                    self.state = EnvelopeState::Sustain;
                }
            }
            EnvelopeState::Sustain => {
                self.level = self.sustain;
            }
            EnvelopeState::Release => {
                self.level -= self.active_release_rate;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.state = EnvelopeState::Idle;
                    self.active_release_rate = self.release_rate;
                }
            }
        }
        self.level
    }

    fn rate_for(&self, seconds: f32) -> f32 {
        1.0 / (seconds * self.sample_rate).max(MIN_RAMP_SAMPLES)
    }

    fn update_rates(&mut self) {
        self.attack_rate = self.rate_for(self.attack_s);
        self.decay_rate = self.rate_for(self.decay_s);
        self.release_rate = self.rate_for(self.release_s);
        self.active_release_rate = self.release_rate;
    }
}
