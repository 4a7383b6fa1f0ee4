//! Mono sample-processor trait.
//!
//! Implemented by the stateful filters in this crate so voices and tests
//! can drive them uniformly, one sample or one block at a time.

/// A mono audio processor with internal state.
///
/// # Example
///
/// ```rust
/// use jovian_core::Effect;
///
/// struct Gain {
///     gain: f32,
/// }
///
/// impl Effect for Gain {
///     fn process(&mut self, input: f32) -> f32 {
///         input * self.gain
///     }
///
///     fn set_sample_rate(&mut self, _sample_rate: f32) {}
///
///     fn reset(&mut self) {}
/// }
///
/// let mut g = Gain { gain: 0.5 };
/// let mut buf = [1.0_f32; 4];
/// g.process_block_inplace(&mut buf);
/// assert_eq!(buf, [0.5; 4]);
/// ```
pub trait Effect {
    /// Process a single sample, advancing internal state by one step.
    fn process(&mut self, input: f32) -> f32;

    /// Process a block of samples.
    ///
    /// `input` and `output` must have the same length.
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(
            input.len(),
            output.len(),
            "Input and output buffers must have same length"
        );
        for (inp, out) in input.iter().zip(output.iter_mut()) {
            *out = self.process(*inp);
        }
    }

    /// Process a block of samples in place.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Update the sample rate and recompute any derived coefficients.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear internal state (delay memory, integrators) without touching settings.
    fn reset(&mut self);
}
