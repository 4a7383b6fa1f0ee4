//! Fixed-capacity delay line.
//!
//! Storage is a const-generic array, so the line lives inline in its owner
//! and never touches the heap. Reads are fractional with linear
//! interpolation, which is enough for the slowly modulated taps of the
//! stereo widener.

/// Fixed-size delay line (no heap allocation).
///
/// `read(0.0)` returns the most recently written sample.
///
/// # Example
///
/// ```rust
/// use jovian_core::FixedDelayLine;
///
/// let mut delay: FixedDelayLine<64> = FixedDelayLine::new();
/// delay.write(1.0);
/// delay.write(0.0);
/// assert_eq!(delay.read(1.0), 1.0);
/// assert_eq!(delay.read(0.5), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct FixedDelayLine<const N: usize> {
    buffer: [f32; N],
    write_pos: usize,
}

impl<const N: usize> FixedDelayLine<N> {
    /// Create an empty delay line.
    pub fn new() -> Self {
        Self {
            buffer: [0.0; N],
            write_pos: 0,
        }
    }

    /// Longest readable delay in samples.
    pub const fn max_delay(&self) -> usize {
        N - 2
    }

    /// Push one sample.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % N;
    }

    /// Read `delay_samples` behind the newest sample, linearly interpolated.
    ///
    /// Delays are clamped to `0..=max_delay()`.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let delay = delay_samples.clamp(0.0, self.max_delay() as f32);
        let delay_int = delay as usize;
        let frac = delay - delay_int as f32;

        let read_pos = (self.write_pos + N - delay_int - 1) % N;
        let next_pos = (read_pos + N - 1) % N;
        let a = self.buffer[read_pos];
        let b = self.buffer[next_pos];
        a + (b - a) * frac
    }

    /// Zero the buffer.
    pub fn clear(&mut self) {
        self.buffer = [0.0; N];
        self.write_pos = 0;
    }
}

impl<const N: usize> Default for FixedDelayLine<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_delay() {
        let mut d: FixedDelayLine<16> = FixedDelayLine::new();
        for i in 0..10 {
            d.write(i as f32);
        }
        assert_eq!(d.read(0.0), 9.0);
        assert_eq!(d.read(3.0), 6.0);
    }

    #[test]
    fn test_fractional_delay_interpolates() {
        let mut d: FixedDelayLine<16> = FixedDelayLine::new();
        d.write(0.0);
        d.write(2.0);
        assert!((d.read(0.25) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_wraps_around_buffer() {
        let mut d: FixedDelayLine<8> = FixedDelayLine::new();
        for i in 0..20 {
            d.write(i as f32);
        }
        assert_eq!(d.read(2.0), 17.0);
    }

    #[test]
    fn test_delay_clamped_to_capacity() {
        let mut d: FixedDelayLine<8> = FixedDelayLine::new();
        for i in 0..8 {
            d.write(i as f32);
        }
        assert_eq!(d.read(100.0), d.read(6.0));
    }

    #[test]
    fn test_clear() {
        let mut d: FixedDelayLine<8> = FixedDelayLine::new();
        d.write(1.0);
        d.clear();
        assert_eq!(d.read(0.0), 0.0);
    }
}
