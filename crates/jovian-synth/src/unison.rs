//! Unison stack: detuned copies of one oscillator pair spread across stereo.
//!
//! Copy 0 sits at the played pitch in the center. Further copies come in
//! sharp/flat pairs whose detune shrinks by the golden ratio per pair, and
//! each copy is panned by the golden angle so no two land on the same spot.
//!
//! ## Detune Distribution
//!
//! For spread `d` cents, copy `i >= 1` gets:
//! ```text
//! k     = (i + 1) / 2
//! cents = ±d * PHI^-(k - 1)      (+ for odd i, - for even i)
//! ```
//!
//! ## Pan Distribution
//!
//! ```text
//! pan(0) = 0
//! pan(i) = cos(i * GOLDEN_ANGLE)
//! ```
//! Pan gains use the equal-power law. Each channel is normalized by the sum
//! of its gains, so copies in lock-step (zero detune) reproduce the single
//! copy exactly.

use crate::oscillator::{DcoPair, DcoWaveform, PairMix};
use jovian_core::equal_power_pan;
use libm::{cosf, exp2f, powf};

/// Maximum number of unison copies.
pub const MAX_UNISON: usize = 7;

/// Golden ratio.
pub const PHI: f32 = 1.618_034;

/// Golden angle in radians, `2π(1 - 1/φ)`.
pub const GOLDEN_ANGLE: f32 = core::f32::consts::TAU * (1.0 - 1.0 / PHI);

/// Detune in cents of copy `index` for a spread of `detune_cents`.
pub fn copy_detune_cents(index: usize, detune_cents: f32) -> f32 {
    if index == 0 {
        return 0.0;
    }
    let k = (index + 1) / 2;
    let sign = if index % 2 == 1 { 1.0 } else { -1.0 };
    sign * detune_cents * powf(PHI, -((k - 1) as f32))
}

/// Pan position (-1..1) of copy `index`.
pub fn copy_pan(index: usize) -> f32 {
    if index == 0 {
        0.0
    } else {
        cosf(index as f32 * GOLDEN_ANGLE)
    }
}

/// Up to [`MAX_UNISON`] oscillator pairs rendered to stereo.
///
/// # Example
///
/// ```rust
/// use jovian_synth::{PairMix, UnisonStack};
///
/// let mut stack = UnisonStack::new(48000.0);
/// stack.set_count(5);
/// stack.set_detune_cents(20.0);
/// stack.set_frequencies(110.0, 110.0);
///
/// let (left, right) = stack.process(&PairMix::default());
/// assert!(left.is_finite() && right.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct UnisonStack {
    pairs: [DcoPair; MAX_UNISON],
    ratios: [f32; MAX_UNISON],
    gains: [(f32, f32); MAX_UNISON],
    count: usize,
    detune_cents: f32,
    norm_left: f32,
    norm_right: f32,
}

impl UnisonStack {
    /// Create a single-copy stack at `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        let mut gains = [(0.0, 0.0); MAX_UNISON];
        for (i, gain) in gains.iter_mut().enumerate() {
            *gain = equal_power_pan(copy_pan(i));
        }
        let mut stack = Self {
            pairs: core::array::from_fn(|_| DcoPair::new(sample_rate)),
            ratios: [1.0; MAX_UNISON],
            gains,
            count: 1,
            detune_cents: 0.0,
            norm_left: 1.0,
            norm_right: 1.0,
        };
        stack.update_norm();
        stack
    }

    /// Set the number of active copies, clamped to `1..=MAX_UNISON`.
    pub fn set_count(&mut self, count: usize) {
        let count = count.clamp(1, MAX_UNISON);
        if count != self.count {
            self.count = count;
            self.update_norm();
        }
    }

    /// Number of active copies.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Set the detune spread in cents. Ratios are recomputed only on change.
    pub fn set_detune_cents(&mut self, cents: f32) {
        let cents = cents.max(0.0);
        if cents == self.detune_cents {
            return;
        }
        self.detune_cents = cents;
        for (i, ratio) in self.ratios.iter_mut().enumerate() {
            *ratio = exp2f(copy_detune_cents(i, cents) / 1200.0);
        }
    }

    /// Detune spread in cents.
    pub fn detune_cents(&self) -> f32 {
        self.detune_cents
    }

    /// Frequency ratio applied to copy `index`.
    pub fn ratio(&self, index: usize) -> f32 {
        self.ratios.get(index).copied().unwrap_or(1.0)
    }

    /// Set the base frequencies of DCO1 and DCO2 for every copy.
    #[inline]
    pub fn set_frequencies(&mut self, dco1_hz: f32, dco2_hz: f32) {
        for (pair, &ratio) in self.pairs[..self.count].iter_mut().zip(&self.ratios) {
            pair.set_frequencies(dco1_hz * ratio, dco2_hz * ratio);
        }
    }

    /// Waveforms shared by every copy.
    pub fn set_waveforms(&mut self, dco1: DcoWaveform, dco2: DcoWaveform) {
        for pair in &mut self.pairs {
            pair.dco1.set_waveform(dco1);
            pair.dco2.set_waveform(dco2);
        }
    }

    /// Pulse widths shared by every copy.
    #[inline]
    pub fn set_pulse_widths(&mut self, dco1: f32, dco2: f32) {
        for pair in &mut self.pairs[..self.count] {
            pair.dco1.set_pulse_width(dco1);
            pair.dco2.set_pulse_width(dco2);
        }
    }

    /// Restart every copy at phase zero.
    pub fn sync_all(&mut self) {
        for pair in &mut self.pairs {
            pair.reset_phases();
        }
    }

    /// Update the sample rate of every copy.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        for pair in &mut self.pairs {
            pair.set_sample_rate(sample_rate);
        }
    }

    /// Clear all oscillator state.
    pub fn reset(&mut self) {
        for pair in &mut self.pairs {
            pair.reset();
        }
    }

    /// Render one stereo sample.
    #[inline]
    pub fn process(&mut self, mix: &PairMix) -> (f32, f32) {
        let mut left = 0.0;
        let mut right = 0.0;
        for (pair, &(gl, gr)) in self.pairs[..self.count].iter_mut().zip(&self.gains) {
            let s = pair.process(mix);
            left += s * gl;
            right += s * gr;
        }
        (left * self.norm_left, right * self.norm_right)
    }

    fn update_norm(&mut self) {
        let (sum_l, sum_r) = self.gains[..self.count]
            .iter()
            .fold((0.0, 0.0), |(l, r), &(gl, gr)| (l + gl, r + gr));
        self.norm_left = 1.0 / sum_l.max(1e-3);
        self.norm_right = 1.0 / sum_r.max(1e-3);
    }
}
