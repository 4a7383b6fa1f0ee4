//! Low Frequency Oscillator with delayed fade-in.
//!
//! The synth's single modulation LFO. It runs free across notes and is
//! shaped by an optional delay: after [`Lfo::trigger`] (sent on note-on)
//! the output amplitude rises linearly from zero to full over the delay
//! time, so vibrato and filter wobble can swell in behind a held note.

/// Shortest supported LFO rate in Hz.
pub const MIN_RATE_HZ: f32 = 0.1;
/// Fastest supported LFO rate in Hz.
pub const MAX_RATE_HZ: f32 = 20.0;
/// Longest supported fade-in delay in seconds.
pub const MAX_DELAY_S: f32 = 5.0;

/// LFO waveform type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LfoWaveform {
    /// Symmetric triangle, starting at -1.
    #[default]
    Triangle,
    /// Rising ramp from -1 to 1.
    Ramp,
    /// Square, +1 for the first half cycle.
    Square,
    /// Random value held for one cycle.
    SampleAndHold,
}

impl LfoWaveform {
    /// Map a selector index (0..=3) to a waveform. Out-of-range indices clamp.
    pub fn from_index(index: i32) -> Self {
        match index {
            i32::MIN..=0 => Self::Triangle,
            1 => Self::Ramp,
            2 => Self::Square,
            _ => Self::SampleAndHold,
        }
    }
}

/// Map a normalized rate control (0..1) to Hz.
///
/// Quadratic curve `0.1 + n² · 19.9` for fine resolution at slow rates.
#[inline]
pub fn rate_from_normalized(n: f32) -> f32 {
    let n = n.clamp(0.0, 1.0);
    MIN_RATE_HZ + n * n * (MAX_RATE_HZ - MIN_RATE_HZ)
}

/// Low frequency oscillator.
///
/// # Example
///
/// ```rust
/// use jovian_core::{Lfo, LfoWaveform};
///
/// let mut lfo = Lfo::new(48000.0, 5.0);
/// lfo.set_waveform(LfoWaveform::Triangle);
/// lfo.set_delay(0.5);
/// lfo.trigger();
///
/// // Silent at the start of the fade
/// assert_eq!(lfo.advance(), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    /// Current phase position [0.0, 1.0)
    phase: f32,
    /// Phase increment per sample
    phase_inc: f32,
    sample_rate: f32,
    waveform: LfoWaveform,
    /// Held value for sample-and-hold
    sh_value: f32,
    /// LCG state for sample-and-hold
    seed: u32,
    /// Delay fade position, 0.0 (silent) to 1.0 (full)
    fade: f32,
    /// Fade increment per sample; 0 disables the delay
    fade_inc: f32,
    delay_s: f32,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(48000.0, 1.0)
    }
}

impl Lfo {
    /// Create a free-running LFO at `freq_hz` with no delay.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        let mut lfo = Self {
            phase: 0.0,
            phase_inc: 0.0,
            sample_rate,
            waveform: LfoWaveform::Triangle,
            sh_value: 0.0,
            seed: 0x1234_5678,
            fade: 1.0,
            fade_inc: 0.0,
            delay_s: 0.0,
        };
        lfo.set_frequency(freq_hz);
        lfo
    }

    /// Set frequency in Hz, clamped to 0.1..=20.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.phase_inc = freq_hz.clamp(MIN_RATE_HZ, MAX_RATE_HZ) / self.sample_rate;
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.phase_inc * self.sample_rate
    }

    /// Set waveform. Takes effect on the next sample.
    pub fn set_waveform(&mut self, waveform: LfoWaveform) {
        self.waveform = waveform;
    }

    /// Current waveform.
    pub fn waveform(&self) -> LfoWaveform {
        self.waveform
    }

    /// Set the fade-in delay in seconds (0..=5). Zero disables the fade.
    ///
    /// A fade already in progress continues at the new rate.
    pub fn set_delay(&mut self, seconds: f32) {
        self.delay_s = seconds.clamp(0.0, MAX_DELAY_S);
        self.recalculate_fade();
        if self.fade_inc == 0.0 {
            self.fade = 1.0;
        }
    }

    /// Fade-in delay in seconds.
    pub fn delay(&self) -> f32 {
        self.delay_s
    }

    /// Note-on: restart the delay fade. The phase keeps running.
    pub fn trigger(&mut self) {
        if self.fade_inc > 0.0 {
            self.fade = 0.0;
        }
    }

    /// Current fade amount, 0.0 to 1.0.
    pub fn fade(&self) -> f32 {
        self.fade
    }

    /// Reset phase, fade, and sample-and-hold state.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.sh_value = 0.0;
        self.fade = 1.0;
    }

    /// Set phase (0.0 - 1.0).
    pub fn set_phase(&mut self, phase: f32) {
        self.phase = phase.clamp(0.0, 1.0) % 1.0;
    }

    /// Current phase (0.0 - 1.0).
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Advance one sample and return the faded bipolar value (-1.0 to 1.0).
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let raw = match self.waveform {
            LfoWaveform::Triangle => {
                if self.phase < 0.5 {
                    4.0 * self.phase - 1.0
                } else {
                    3.0 - 4.0 * self.phase
                }
            }
            LfoWaveform::Ramp => 2.0 * self.phase - 1.0,
            LfoWaveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            LfoWaveform::SampleAndHold => self.sh_value,
        };

        let out = raw * self.fade;
        if self.fade < 1.0 {
            self.fade = (self.fade + self.fade_inc).min(1.0);
        }

        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
            self.sh_value = self.next_random();
        }

        out
    }

    /// Update sample rate, preserving frequency and delay time.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        let freq = self.frequency();
        self.sample_rate = sample_rate;
        self.set_frequency(freq);
        self.recalculate_fade();
    }

    fn recalculate_fade(&mut self) {
        self.fade_inc = if self.delay_s > 0.0 {
            1.0 / (self.delay_s * self.sample_rate)
        } else {
            0.0
        };
    }

    // 31-bit LCG mapped to [-1, 1]
    fn next_random(&mut self) -> f32 {
        self.seed = self.seed.wrapping_mul(1_103_515_245).wrapping_add(12345) & 0x7FFF_FFFF;
        self.seed as f32 / 1_073_741_823.5 - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lfo_one_cycle_per_period() {
        let mut lfo = Lfo::new(48000.0, 2.0);
        for _ in 0..24000 {
            lfo.advance();
        }
        let phase_error = lfo.phase().min((lfo.phase() - 1.0).abs());
        assert!(phase_error < 0.01, "phase {}", lfo.phase());
    }

    #[test]
    fn test_lfo_output_range() {
        let mut lfo = Lfo::new(48000.0, 20.0);
        for waveform in [
            LfoWaveform::Triangle,
            LfoWaveform::Ramp,
            LfoWaveform::Square,
            LfoWaveform::SampleAndHold,
        ] {
            lfo.set_waveform(waveform);
            lfo.reset();
            for _ in 0..10_000 {
                let value = lfo.advance();
                assert!(
                    (-1.0..=1.0).contains(&value),
                    "Waveform {:?} out of range: {}",
                    waveform,
                    value
                );
            }
        }
    }

    #[test]
    fn test_lfo_frequency_clamped() {
        let mut lfo = Lfo::new(48000.0, 100.0);
        assert!((lfo.frequency() - MAX_RATE_HZ).abs() < 1e-3);
        lfo.set_frequency(0.0);
        assert!((lfo.frequency() - MIN_RATE_HZ).abs() < 1e-4);
    }

    #[test]
    fn test_lfo_delay_fades_in_linearly() {
        let mut lfo = Lfo::new(1000.0, 0.1);
        lfo.set_waveform(LfoWaveform::Square);
        lfo.set_delay(1.0);
        lfo.trigger();

        assert_eq!(lfo.advance(), 0.0);
        for _ in 0..499 {
            lfo.advance();
        }
        assert!((lfo.fade() - 0.5).abs() < 0.01, "fade {}", lfo.fade());
        for _ in 0..600 {
            lfo.advance();
        }
        assert_eq!(lfo.fade(), 1.0);
    }

    #[test]
    fn test_lfo_no_delay_is_full_amplitude() {
        let mut lfo = Lfo::new(48000.0, 1.0);
        lfo.set_waveform(LfoWaveform::Square);
        lfo.trigger();
        assert_eq!(lfo.advance(), 1.0);
    }

    #[test]
    fn test_lfo_trigger_keeps_phase_running() {
        let mut lfo = Lfo::new(48000.0, 5.0);
        for _ in 0..1000 {
            lfo.advance();
        }
        let phase = lfo.phase();
        lfo.trigger();
        assert_eq!(lfo.phase(), phase);
    }

    #[test]
    fn test_lfo_sample_and_hold_steps() {
        let mut lfo = Lfo::new(1000.0, 10.0);
        lfo.set_waveform(LfoWaveform::SampleAndHold);
        // Mid-way through the second cycle, after the first draw
        for _ in 0..150 {
            lfo.advance();
        }
        let held = lfo.advance();
        assert_ne!(held, 0.0);
        for _ in 0..40 {
            assert_eq!(lfo.advance(), held);
        }
    }

    #[test]
    fn test_rate_curve() {
        assert!((rate_from_normalized(0.0) - 0.1).abs() < 1e-6);
        assert!((rate_from_normalized(1.0) - 20.0).abs() < 1e-4);
        assert!(rate_from_normalized(0.5) < 10.0);
    }
}
