//! The complete instrument: parameters, presets, notes and block rendering.
//!
//! [`SynthEngine`] is a plain owned struct with no heap state, driven by a
//! single host thread. The host writes integer parameters and MIDI-style
//! note events between buffers and calls [`SynthEngine::render`] once per
//! buffer. Nothing in here returns an error: ids out of range are ignored,
//! values are clamped and oversize render requests are cut to
//! [`MAX_FRAMES`].

use core::fmt;

use crate::allocator::{AllocationStrategy, SynthMode, VoiceAllocator};
use crate::mod_hub::{ModDestination, ModHub};
use crate::output::{EffectMode, OutputStage};
use crate::params::{NUM_PARAMS, Param, default_values};
use crate::presets::{FactoryPreset, NUM_FACTORY_PRESETS, Preset, factory_presets};
use crate::render::{
    MonoRenderer, PolyRenderer, RenderSetup, SampleTick, UnisonRenderer, glide_rate, render_block,
};
use crate::unison::MAX_UNISON;
use jovian_core::lfo::{MAX_DELAY_S, rate_from_normalized};
use jovian_core::{Lfo, LfoWaveform, ParamDescriptor, ParameterInfo, SmoothedParam};

/// Largest block rendered per call, in frames.
pub const MAX_FRAMES: usize = 256;

/// Voices in the pool.
pub const NUM_VOICES: usize = 6;

/// Rate used before `init` and when `init` gets a bad rate.
pub const DEFAULT_SAMPLE_RATE: f32 = 48000.0;

/// Unison copies unless configured otherwise.
pub const DEFAULT_UNISON_VOICES: usize = 5;

/// Smoothing of cutoff, oscillator mix, level, pressure and pitch bend.
const SMOOTHING_MS: f32 = 10.0;

/// Pitch bend range in semitones.
const BEND_RANGE: f32 = 2.0;

const DISPLAY_LEN: usize = 32;

/// Fixed buffer for formatted display strings.
#[derive(Debug, Clone)]
struct DisplayBuffer {
    buf: [u8; DISPLAY_LEN],
    len: usize,
}

impl DisplayBuffer {
    const fn new() -> Self {
        Self {
            buf: [0; DISPLAY_LEN],
            len: 0,
        }
    }

    fn clear(&mut self) {
        self.len = 0;
    }

    fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.buf[..self.len]).ok()
    }
}

impl fmt::Write for DisplayBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = DISPLAY_LEN - self.len;
        let mut take = s.len().min(room);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        if take < s.len() { Err(fmt::Error) } else { Ok(()) }
    }
}

/// Polyphonic subtractive synthesizer.
///
/// # Example
///
/// ```rust
/// use jovian_synth::{Param, SynthEngine};
///
/// let mut synth = SynthEngine::new();
/// synth.init(48000.0);
/// synth.load_preset(1);
/// synth.set_parameter(Param::Cutoff.index() as u8, 60);
///
/// synth.note_on(48, 100);
/// let mut out = [0.0_f32; 128];
/// synth.render(&mut out, 64);
/// assert!(out.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
/// ```
#[derive(Debug, Clone)]
pub struct SynthEngine {
    allocator: VoiceAllocator<NUM_VOICES>,
    mono: MonoRenderer,
    poly: PolyRenderer,
    unison: UnisonRenderer,
    output: OutputStage,
    lfo: Lfo,
    hub: ModHub,
    params: [i32; NUM_PARAMS],
    presets: [FactoryPreset; NUM_FACTORY_PRESETS],
    current_preset: usize,

    cutoff: SmoothedParam,
    osc_mix: SmoothedParam,
    vca_level: SmoothedParam,
    pressure: SmoothedParam,
    bend: SmoothedParam,

    pending_mode: Option<SynthMode>,
    envelopes_dirty: bool,
    pressure_target: f32,
    sample_rate: f32,
    suspended: bool,

    ticks: [SampleTick; MAX_FRAMES],
    mono_buf: [f32; MAX_FRAMES],
    display: DisplayBuffer,
}

impl Default for SynthEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthEngine {
    /// Create an engine at [`DEFAULT_SAMPLE_RATE`] with default parameters.
    pub fn new() -> Self {
        let sr = DEFAULT_SAMPLE_RATE;
        let mut engine = Self {
            allocator: VoiceAllocator::new(sr),
            mono: MonoRenderer,
            poly: PolyRenderer::new(sr),
            unison: UnisonRenderer::new(sr, DEFAULT_UNISON_VOICES),
            output: OutputStage::new(sr),
            lfo: Lfo::new(sr, 1.0),
            hub: ModHub::new(),
            params: default_values(),
            presets: factory_presets(),
            current_preset: 0,
            cutoff: SmoothedParam::with_config(1000.0, sr, SMOOTHING_MS),
            osc_mix: SmoothedParam::with_config(0.0, sr, SMOOTHING_MS),
            vca_level: SmoothedParam::with_config(1.0, sr, SMOOTHING_MS),
            pressure: SmoothedParam::with_config(0.0, sr, SMOOTHING_MS),
            bend: SmoothedParam::with_config(0.0, sr, SMOOTHING_MS),
            pending_mode: None,
            envelopes_dirty: true,
            pressure_target: 0.0,
            sample_rate: sr,
            suspended: false,
            ticks: [SampleTick::default(); MAX_FRAMES],
            mono_buf: [0.0; MAX_FRAMES],
            display: DisplayBuffer::new(),
        };
        engine.params[Param::ModAmount.index()] = i32::from(engine.hub.current_raw());
        engine.sync_derived();
        engine.snap_smoothers();
        engine
    }

    // ---- lifecycle ----

    /// Prepare for `sample_rate`. Non-positive or non-finite rates fall
    /// back to [`DEFAULT_SAMPLE_RATE`].
    pub fn init(&mut self, sample_rate: f32) {
        let sr = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate
        } else {
            DEFAULT_SAMPLE_RATE
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(requested = sample_rate, sample_rate = sr, "engine init");

        self.sample_rate = sr;
        self.suspended = false;
        self.allocator.set_sample_rate(sr);
        self.poly.set_sample_rate(sr);
        self.unison.set_sample_rate(sr);
        self.output.set_sample_rate(sr);
        self.lfo.set_sample_rate(sr);
        self.cutoff.set_sample_rate(sr);
        self.osc_mix.set_sample_rate(sr);
        self.vca_level.set_sample_rate(sr);
        self.pressure.set_sample_rate(sr);
        self.bend.set_sample_rate(sr);
        self.reset();
        self.sync_derived();
        self.snap_smoothers();
    }

    /// Leave the suspended state.
    pub fn resume(&mut self) {
        self.suspended = false;
    }

    /// Release all notes; `render` outputs silence until [`resume`](Self::resume).
    pub fn suspend(&mut self) {
        self.all_notes_off();
        self.suspended = true;
    }

    /// True between `suspend` and `resume`.
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Silence every voice and clear all DSP state. Parameters are kept.
    pub fn reset(&mut self) {
        self.allocator.reset();
        self.poly.reset();
        self.unison.stack.reset();
        self.output.reset();
        self.lfo.reset();
        self.bend.set_immediate(0.0);
        self.pressure_target = 0.0;
        self.pressure.set_immediate(0.0);
        if let Some(mode) = self.pending_mode.take() {
            self.apply_mode(mode);
        }
        self.envelopes_dirty = true;
    }

    /// Final shutdown: silence and reset. The engine stays usable.
    pub fn teardown(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!("engine teardown");
        self.reset();
        self.suspended = true;
    }

    /// Current sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    // ---- configuration ----

    /// Number of unison copies (clamped to `1..=7`).
    pub fn set_unison_voices(&mut self, voices: usize) {
        self.unison.set_voices(voices.clamp(1, MAX_UNISON));
    }

    /// Number of unison copies.
    pub fn unison_voices(&self) -> usize {
        self.unison.voices()
    }

    /// Free-voice strategy in poly mode.
    pub fn set_allocation_strategy(&mut self, strategy: AllocationStrategy) {
        self.allocator.set_strategy(strategy);
    }

    /// Fade time of a stolen voice in milliseconds.
    pub fn set_steal_release_ms(&mut self, ms: f32) {
        self.allocator.set_steal_release_ms(ms);
    }

    // ---- state inspection ----

    /// Voice mode in effect.
    pub fn mode(&self) -> SynthMode {
        self.allocator.mode()
    }

    /// Mode waiting for the voices to go idle.
    pub fn pending_mode(&self) -> Option<SynthMode> {
        self.pending_mode
    }

    /// Voices producing sound.
    pub fn active_voices(&self) -> usize {
        self.allocator.active_count()
    }

    /// Voice pool.
    pub fn allocator(&self) -> &VoiceAllocator<NUM_VOICES> {
        &self.allocator
    }

    /// Modulation hub.
    pub fn hub(&self) -> &ModHub {
        &self.hub
    }

    /// Widener setting in effect.
    pub fn effect_mode(&self) -> EffectMode {
        self.output.mode()
    }

    // ---- parameters ----

    /// Set parameter `id`. Values are clamped; unknown ids are ignored.
    pub fn set_parameter(&mut self, id: u8, value: i32) {
        let Some(param) = Param::from_index(usize::from(id)) else {
            return;
        };
        let value = param.descriptor().clamp(value);
        self.params[param.index()] = value;

        match param {
            Param::ModHub => {
                self.hub.set_destination(value as usize);
                self.params[Param::ModAmount.index()] = i32::from(self.hub.current_raw());
            }
            Param::ModAmount => {
                self.hub.set_value(value);
                self.hub_changed(self.hub.destination());
            }
            Param::Effect => self.output.set_mode(EffectMode::from_index(value)),
            Param::FilterAttack
            | Param::FilterDecay
            | Param::FilterSustain
            | Param::FilterRelease
            | Param::AmpAttack
            | Param::AmpDecay
            | Param::AmpSustain
            | Param::AmpRelease => self.envelopes_dirty = true,
            Param::LfoRate => self.update_lfo(),
            _ => {}
        }
    }

    /// Value of parameter `id`; 0 for unknown ids.
    ///
    /// MOD AMT reads the raw value of the selected hub destination.
    pub fn parameter(&self, id: u8) -> i32 {
        match Param::from_index(usize::from(id)) {
            Some(Param::ModAmount) => i32::from(self.hub.current_raw()),
            Some(param) => self.params[param.index()],
            None => 0,
        }
    }

    /// Display text for `value` of parameter `id`.
    ///
    /// Choice parameters give their label, MOD HUB the destination name and
    /// MOD AMT the selected destination's value with its unit. Plain
    /// numbers give `None`.
    pub fn parameter_display(&mut self, id: u8, value: i32) -> Option<&str> {
        let param = Param::from_index(usize::from(id))?;
        match param {
            Param::ModHub => ModDestination::from_index(usize::try_from(value).ok()?)
                .map(|d| d.descriptor().name),
            Param::ModAmount => {
                let raw = value.clamp(0, 100) as u8;
                self.display.clear();
                // Overflow truncates; the truncated text is still shown
                let _ = self.hub.format_value(self.hub.destination(), raw, &mut self.display);
                self.display.as_str()
            }
            _ => param.descriptor().choice_label(value),
        }
    }

    // ---- notes ----

    /// Start `note`. Velocity 0 is a note-off.
    pub fn note_on(&mut self, note: u8, velocity: u8) {
        let note = note.min(127);
        let velocity = velocity.min(127);
        if velocity == 0 {
            self.note_off(note);
            return;
        }

        let first = !self.allocator.voices().iter().any(|v| v.is_gated());
        let outcome = self
            .allocator
            .note_on(note, f32::from(velocity) / 127.0);

        if outcome.retriggered {
            if first {
                self.lfo.trigger();
            }
            if self.allocator.mode() == SynthMode::Unison {
                self.unison.stack.sync_all();
            }
        }
    }

    /// Release `note`.
    pub fn note_off(&mut self, note: u8) {
        self.allocator.note_off(note.min(127));
    }

    /// Release every voice.
    pub fn all_notes_off(&mut self) {
        self.allocator.all_notes_off();
    }

    /// 14-bit pitch bend, 8192 centered, ±2 semitones.
    pub fn pitch_bend(&mut self, value: u16) {
        let v = f32::from(value.min(16383));
        self.bend.set_target((v - 8192.0) / 8192.0 * BEND_RANGE);
    }

    /// Channel pressure: full pressure opens the filter one octave.
    pub fn channel_pressure(&mut self, value: u8) {
        self.pressure_target = f32::from(value.min(127)) / 127.0;
    }

    /// Polyphonic aftertouch. Applied as pressure while `note` is held;
    /// ignored otherwise.
    pub fn aftertouch(&mut self, note: u8, value: u8) {
        let note = note.min(127);
        if self
            .allocator
            .voices()
            .iter()
            .any(|v| v.is_gated() && v.held_note() == note)
        {
            self.channel_pressure(value);
        }
    }

    // ---- presets ----

    /// Load factory preset `index`; out-of-range loads preset 0.
    pub fn load_preset(&mut self, index: usize) {
        let index = if index < NUM_FACTORY_PRESETS { index } else { 0 };
        #[cfg(feature = "tracing")]
        tracing::debug!(index, name = self.presets[index].name, "load preset");
        let preset = self.presets[index].preset;
        self.apply_preset(&preset);
        self.current_preset = index;
    }

    /// Factory presets are read-only; saving does nothing.
    pub fn save_preset(&mut self, _index: usize) {}

    /// Number of factory presets.
    pub fn preset_count(&self) -> usize {
        NUM_FACTORY_PRESETS
    }

    /// Name of factory preset `index`.
    pub fn preset_name(&self, index: usize) -> Option<&'static str> {
        self.presets.get(index).map(|p| p.name)
    }

    /// Index of the last loaded factory preset.
    pub fn preset_index(&self) -> usize {
        self.current_preset
    }

    /// Replace the whole sound with `preset`.
    pub fn apply_preset(&mut self, preset: &Preset) {
        for param in Param::ALL {
            let i = param.index();
            self.params[i] = param.descriptor().clamp(preset.params[i]);
        }
        self.hub.load_raw(&preset.hub);
        self.hub
            .set_destination(self.params[Param::ModHub.index()] as usize);
        self.params[Param::ModAmount.index()] = i32::from(self.hub.current_raw());
        self.sync_derived();
    }

    /// Snapshot of the current sound.
    pub fn current_preset(&self) -> Preset {
        let mut params = self.params;
        params[Param::ModAmount.index()] = i32::from(self.hub.current_raw());
        Preset {
            params,
            hub: self.hub.raw_values(),
        }
    }

    // ---- rendering ----

    /// Render `frames` interleaved stereo frames into `out`.
    ///
    /// At most `min(frames, MAX_FRAMES, out.len() / 2)` frames are rendered;
    /// the rest of the requested region is zeroed.
    pub fn render(&mut self, out: &mut [f32], frames: usize) {
        if frames == 0 || out.is_empty() {
            return;
        }
        let n = frames.min(MAX_FRAMES).min(out.len() / 2);
        let requested = frames.saturating_mul(2).min(out.len());
        out[n * 2..requested].fill(0.0);
        if n == 0 {
            return;
        }
        if self.suspended {
            out[..n * 2].fill(0.0);
            return;
        }

        if let Some(mode) = self.pending_mode {
            if self.allocator.is_idle() {
                self.pending_mode = None;
                self.apply_mode(mode);
            }
        }
        if self.envelopes_dirty {
            self.apply_envelopes();
        }

        let setup = RenderSetup::build(&self.params, &self.hub, self.sample_rate);
        self.fill_ticks(&setup, n);

        let mode = self.allocator.mode();
        let voices = self.allocator.voices_mut();
        let ticks = &self.ticks[..n];
        let mono = &mut self.mono_buf[..n];
        match mode {
            SynthMode::Mono => render_block(&mut self.mono, voices, &setup, ticks, mono),
            SynthMode::Poly => render_block(&mut self.poly, voices, &setup, ticks, mono),
            SynthMode::Unison => render_block(&mut self.unison, voices, &setup, ticks, mono),
        }

        self.output.process_block(&self.mono_buf[..n], &mut out[..n * 2]);
    }

    fn fill_ticks(&mut self, setup: &RenderSetup, n: usize) {
        self.cutoff.set_target(setup.cutoff_hz);
        self.osc_mix.set_target(setup.osc_mix);
        self.vca_level.set_target(setup.vca_level);
        self.pressure.set_target(self.pressure_target);

        for tick in &mut self.ticks[..n] {
            let lfo = self.lfo.advance();
            let tremolo = 1.0 - setup.tremolo * 0.5 * (1.0 - lfo);
            *tick = SampleTick {
                lfo,
                cutoff_hz: self.cutoff.advance(),
                osc_mix: self.osc_mix.advance(),
                vca_gain: self.vca_level.advance() * tremolo * 0.5,
                pressure: self.pressure.advance(),
                bend: self.bend.advance(),
            };
        }
    }

    /// Push rate, waveform and delay into the LFO. Runs on every change so
    /// a note-on before the next render already sees the new delay.
    fn update_lfo(&mut self) {
        let rate = Param::LfoRate.descriptor().normalize(self.params[Param::LfoRate.index()]);
        self.lfo.set_frequency(rate_from_normalized(rate));
        self.lfo
            .set_waveform(LfoWaveform::from_index(self.hub.value(ModDestination::LfoWave)));
        self.lfo
            .set_delay(self.hub.normalized_unipolar(ModDestination::LfoDelay) * MAX_DELAY_S);
    }

    fn apply_envelopes(&mut self) {
        let p = self.params;
        let get = |param: Param| p[param.index()] as f32;
        for voice in self.allocator.voices_mut() {
            for env in [&mut voice.filter_env, &mut voice.pitch_env] {
                env.set_attack(get(Param::FilterAttack));
                env.set_decay(get(Param::FilterDecay));
                env.set_sustain(get(Param::FilterSustain));
                env.set_release(get(Param::FilterRelease));
            }
            voice.amp_env.set_attack(get(Param::AmpAttack));
            voice.amp_env.set_decay(get(Param::AmpDecay));
            voice.amp_env.set_sustain(get(Param::AmpSustain));
            voice.amp_env.set_release(get(Param::AmpRelease));
        }
        self.envelopes_dirty = false;
    }

    /// Re-derive everything that depends on the parameter and hub values.
    fn sync_derived(&mut self) {
        self.output
            .set_mode(EffectMode::from_index(self.params[Param::Effect.index()]));
        self.envelopes_dirty = true;
        self.update_lfo();
        for dest in [ModDestination::Mode, ModDestination::Portamento] {
            self.hub_changed(dest);
        }
    }

    fn snap_smoothers(&mut self) {
        let setup = RenderSetup::build(&self.params, &self.hub, self.sample_rate);
        self.cutoff.set_immediate(setup.cutoff_hz);
        self.osc_mix.set_immediate(setup.osc_mix);
        self.vca_level.set_immediate(setup.vca_level);
        self.output.reset();
    }

    fn hub_changed(&mut self, dest: ModDestination) {
        match dest {
            ModDestination::Mode => {
                self.request_mode(SynthMode::from_index(self.hub.value(ModDestination::Mode)));
            }
            ModDestination::Portamento => {
                self.allocator
                    .set_glide_rate(glide_rate(&self.hub, self.sample_rate));
            }
            ModDestination::LfoWave | ModDestination::LfoDelay => self.update_lfo(),
            _ => {}
        }
    }

    fn request_mode(&mut self, mode: SynthMode) {
        if mode == self.allocator.mode() {
            self.pending_mode = None;
        } else if self.allocator.is_idle() {
            self.pending_mode = None;
            self.apply_mode(mode);
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!(?mode, "mode change deferred until voices are idle");
            self.pending_mode = Some(mode);
        }
    }

    fn apply_mode(&mut self, mode: SynthMode) {
        #[cfg(feature = "tracing")]
        tracing::debug!(?mode, "mode change applied");
        self.allocator.set_mode(mode);
        self.poly.reset();
        self.unison.stack.sync_all();
    }
}

impl ParameterInfo for SynthEngine {
    fn param_count(&self) -> usize {
        NUM_PARAMS
    }

    fn param_info(&self, index: usize) -> Option<&'static ParamDescriptor> {
        Param::from_index(index).map(Param::descriptor)
    }

    fn get_param(&self, index: usize) -> i32 {
        u8::try_from(index).map_or(0, |id| self.parameter(id))
    }

    fn set_param(&mut self, index: usize, value: i32) {
        if let Ok(id) = u8::try_from(index) {
            self.set_parameter(id, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(p: Param) -> u8 {
        p.index() as u8
    }

    #[test]
    fn test_defaults_and_clamping() {
        let mut synth = SynthEngine::new();
        assert_eq!(synth.parameter(id(Param::Cutoff)), 79);
        synth.set_parameter(id(Param::Cutoff), 500);
        assert_eq!(synth.parameter(id(Param::Cutoff)), 100);
        synth.set_parameter(id(Param::Sync), -4);
        assert_eq!(synth.parameter(id(Param::Sync)), 0);
        synth.set_parameter(200, 5);
        assert_eq!(synth.parameter(200), 0);
        assert_eq!(synth.mode(), SynthMode::Poly);
    }

    #[test]
    fn test_display_strings() {
        let mut synth = SynthEngine::new();
        assert_eq!(synth.parameter_display(id(Param::Dco1Wave), 2), Some("PULSE"));
        assert_eq!(synth.parameter_display(id(Param::Dco1Wave), 4), Some("SAW PWM"));
        assert_eq!(synth.parameter_display(id(Param::Effect), 3), Some("BOTH"));
        assert_eq!(synth.parameter_display(id(Param::ModHub), 6), Some("VCF TYP"));
        assert_eq!(synth.parameter_display(id(Param::Cutoff), 40), None);

        synth.set_parameter(id(Param::ModHub), ModDestination::VcfType.index() as i32);
        assert_eq!(synth.parameter_display(id(Param::ModAmount), 33), Some("LP24"));
        synth.set_parameter(id(Param::ModHub), ModDestination::EnvToPitch.index() as i32);
        assert_eq!(synth.parameter_display(id(Param::ModAmount), 100), Some("+12st"));
        assert_eq!(synth.parameter_display(99, 0), None);
    }

    #[test]
    fn test_display_buffer_truncates_on_char_boundary() {
        use core::fmt::Write;
        let mut buf = DisplayBuffer::new();
        for _ in 0..16 {
            buf.write_char('é').unwrap();
        }
        assert!(buf.write_str("é").is_err());
        assert!(buf.write_str("x").is_err());
        let s = buf.as_str().unwrap();
        assert_eq!(s.len(), DISPLAY_LEN);
        assert!(s.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_mod_amount_follows_selection() {
        let mut synth = SynthEngine::new();
        synth.set_parameter(id(Param::ModHub), ModDestination::Tremolo.index() as i32);
        synth.set_parameter(id(Param::ModAmount), 70);
        synth.set_parameter(id(Param::ModHub), ModDestination::Hpf.index() as i32);
        assert_eq!(synth.parameter(id(Param::ModAmount)), 0);
        synth.set_parameter(id(Param::ModHub), ModDestination::Tremolo.index() as i32);
        assert_eq!(synth.parameter(id(Param::ModAmount)), 70);
    }

    #[test]
    fn test_invalid_sample_rate_falls_back() {
        let mut synth = SynthEngine::new();
        synth.init(f32::NAN);
        assert_eq!(synth.sample_rate(), DEFAULT_SAMPLE_RATE);
        synth.init(-1.0);
        assert_eq!(synth.sample_rate(), DEFAULT_SAMPLE_RATE);
        synth.init(96000.0);
        assert_eq!(synth.sample_rate(), 96000.0);
    }

    #[test]
    fn test_velocity_zero_is_note_off() {
        let mut synth = SynthEngine::new();
        synth.note_on(60, 100);
        assert!(synth.allocator().voices().iter().any(|v| v.is_gated()));
        synth.note_on(60, 0);
        assert!(synth.allocator().voices().iter().all(|v| !v.is_gated()));
    }

    #[test]
    fn test_mode_change_applies_when_idle() {
        let mut synth = SynthEngine::new();
        synth.set_parameter(id(Param::ModHub), ModDestination::Mode.index() as i32);
        synth.set_parameter(id(Param::ModAmount), 0);
        assert_eq!(synth.mode(), SynthMode::Mono);
        assert_eq!(synth.pending_mode(), None);
    }

    #[test]
    fn test_suspend_silences_output() {
        let mut synth = SynthEngine::new();
        synth.note_on(60, 127);
        synth.suspend();
        let mut out = [1.0_f32; 64];
        synth.render(&mut out, 32);
        assert!(out.iter().all(|&s| s == 0.0));
        synth.resume();
        assert!(!synth.is_suspended());
    }

    #[test]
    fn test_preset_snapshot_roundtrip() {
        let mut synth = SynthEngine::new();
        synth.load_preset(2);
        let snap = synth.current_preset();
        let mut other = SynthEngine::new();
        other.apply_preset(&snap);
        assert_eq!(other.current_preset(), snap);
        assert_eq!(synth.preset_index(), 2);
        synth.load_preset(99);
        assert_eq!(synth.preset_index(), 0);
        assert_eq!(synth.preset_name(3), Some("Pad 1"));
        assert_eq!(synth.preset_name(6), None);
    }

    #[test]
    fn test_lfo_delay_applies_to_first_note() {
        let mut synth = SynthEngine::new();
        synth.set_parameter(id(Param::ModHub), ModDestination::LfoDelay.index() as i32);
        synth.set_parameter(id(Param::ModAmount), 100);
        assert!((synth.lfo.delay() - MAX_DELAY_S).abs() < 1e-3);

        // No render between the hub change and the note
        synth.note_on(60, 100);
        assert_eq!(synth.lfo.fade(), 0.0);
        let mut out = [0.0_f32; 128];
        synth.render(&mut out, 64);
        assert!(synth.ticks[..64].iter().all(|t| t.lfo.abs() < 0.01));
    }

    #[test]
    fn test_lfo_rate_applies_without_render() {
        let mut synth = SynthEngine::new();
        synth.set_parameter(id(Param::LfoRate), 0);
        let slow = synth.lfo.frequency();
        synth.set_parameter(id(Param::LfoRate), 100);
        assert!(synth.lfo.frequency() > slow);
    }

    #[test]
    fn test_pitch_bend_is_smoothed() {
        let mut synth = SynthEngine::new();
        let mut out = [0.0_f32; 2 * MAX_FRAMES];
        synth.note_on(60, 100);
        synth.render(&mut out, 64);

        synth.pitch_bend(16383);
        synth.render(&mut out, 1);
        assert!(synth.ticks[0].bend > 0.0);
        assert!(synth.ticks[0].bend < 0.1, "bend jumped to {}", synth.ticks[0].bend);

        // 10 ms time constant: settled well within 100 ms
        for _ in 0..20 {
            synth.render(&mut out, MAX_FRAMES);
        }
        let settled = synth.ticks[MAX_FRAMES - 1].bend;
        assert!((settled - BEND_RANGE).abs() < 0.01, "bend settled at {settled}");

        synth.reset();
        synth.render(&mut out, 1);
        assert_eq!(synth.ticks[0].bend, 0.0);
    }
}
