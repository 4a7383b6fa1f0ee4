//! Voice allocation for mono, poly and unison modes.
//!
//! Poly mode spreads notes across the pool and steals when it runs out.
//! Mono and unison modes play voice 0 only and keep a stack of held keys
//! for last-note priority and legato glide.

use crate::envelope::DEFAULT_FORCE_RELEASE_MS;
use crate::voice::{PendingNote, Voice};

/// Held-note capacity in mono and unison modes.
pub const NOTE_STACK_SIZE: usize = 16;

/// Voice mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SynthMode {
    /// One voice, last-note priority.
    Mono,
    /// Independent voices per note (default)
    #[default]
    Poly,
    /// One note through the detuned unison stack.
    Unison,
}

impl SynthMode {
    /// Mode for a hub index; out-of-range values clamp.
    pub fn from_index(index: i32) -> Self {
        match index {
            i32::MIN..=0 => Self::Mono,
            1 => Self::Poly,
            _ => Self::Unison,
        }
    }

    /// Index in hub order.
    pub fn index(self) -> i32 {
        match self {
            Self::Mono => 0,
            Self::Poly => 1,
            Self::Unison => 2,
        }
    }
}

/// How poly mode picks a free voice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AllocationStrategy {
    /// Least recently used free voice (default)
    #[default]
    OldestNote,
    /// Cycle through the pool
    RoundRobin,
    /// Lowest-numbered free voice
    FirstAvailable,
}

/// Result of a note-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteOnOutcome {
    /// Voice the note went to.
    pub voice: usize,
    /// Envelopes restarted.
    pub retriggered: bool,
    /// The voice was taken from another note.
    pub stolen: bool,
}

/// Fixed-capacity stack of held notes, most recent on top.
#[derive(Debug, Clone, Copy)]
pub struct NoteStack {
    notes: [(u8, f32); NOTE_STACK_SIZE],
    len: usize,
}

impl Default for NoteStack {
    fn default() -> Self {
        Self {
            notes: [(0, 0.0); NOTE_STACK_SIZE],
            len: 0,
        }
    }
}

impl NoteStack {
    /// Push `note` on top. A note already held moves to the top; when full
    /// the oldest entry is dropped.
    pub fn push(&mut self, note: u8, velocity: f32) {
        self.remove(note);
        if self.len == NOTE_STACK_SIZE {
            self.notes.copy_within(1.., 0);
            self.len -= 1;
        }
        self.notes[self.len] = (note, velocity);
        self.len += 1;
    }

    /// Remove `note`. Returns true if it was held.
    pub fn remove(&mut self, note: u8) -> bool {
        let Some(pos) = self.notes[..self.len].iter().position(|&(n, _)| n == note) else {
            return false;
        };
        self.notes.copy_within(pos + 1..self.len, pos);
        self.len -= 1;
        true
    }

    /// Most recent note and its velocity.
    pub fn top(&self) -> Option<(u8, f32)> {
        self.len.checked_sub(1).map(|i| self.notes[i])
    }

    /// True if `note` is held.
    pub fn contains(&self, note: u8) -> bool {
        self.notes[..self.len].iter().any(|&(n, _)| n == note)
    }

    /// Number of held notes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no note is held.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Forget every note.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

/// Pool of `N` voices and the per-mode note logic.
///
/// # Example
///
/// ```rust
/// use jovian_synth::{SynthMode, VoiceAllocator};
///
/// let mut alloc: VoiceAllocator<4> = VoiceAllocator::new(48000.0);
/// alloc.set_mode(SynthMode::Poly);
/// alloc.note_on(60, 1.0);
/// alloc.note_on(64, 1.0);
/// assert_eq!(alloc.active_count(), 2);
///
/// alloc.all_notes_off();
/// assert!(alloc.voices().iter().all(|v| !v.is_gated()));
/// ```
#[derive(Debug, Clone)]
pub struct VoiceAllocator<const N: usize> {
    voices: [Voice; N],
    mode: SynthMode,
    strategy: AllocationStrategy,
    stack: NoteStack,
    age_counter: u64,
    round_robin_idx: usize,
    glide_rate: f32,
    steal_release_ms: f32,
}

impl<const N: usize> VoiceAllocator<N> {
    /// Create an idle pool in poly mode.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            voices: core::array::from_fn(|_| Voice::new(sample_rate)),
            mode: SynthMode::Poly,
            strategy: AllocationStrategy::OldestNote,
            stack: NoteStack::default(),
            age_counter: 0,
            round_robin_idx: 0,
            glide_rate: 0.0,
            steal_release_ms: DEFAULT_FORCE_RELEASE_MS,
        }
    }

    /// Update the sample rate of every voice.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        for voice in &mut self.voices {
            voice.set_sample_rate(sample_rate);
        }
    }

    /// Switch mode. Held notes are forgotten; callers switch while idle.
    pub fn set_mode(&mut self, mode: SynthMode) {
        self.mode = mode;
        self.stack.clear();
    }

    /// Current mode.
    pub fn mode(&self) -> SynthMode {
        self.mode
    }

    /// Set the free-voice strategy for poly mode.
    pub fn set_strategy(&mut self, strategy: AllocationStrategy) {
        self.strategy = strategy;
    }

    /// Free-voice strategy.
    pub fn strategy(&self) -> AllocationStrategy {
        self.strategy
    }

    /// Glide rate in octaves per sample; zero jumps.
    pub fn set_glide_rate(&mut self, rate: f32) {
        self.glide_rate = rate.max(0.0);
    }

    /// Glide rate in octaves per sample.
    pub fn glide_rate(&self) -> f32 {
        self.glide_rate
    }

    /// Fade time for a stolen voice, in milliseconds.
    pub fn set_steal_release_ms(&mut self, ms: f32) {
        self.steal_release_ms = ms.max(0.1);
    }

    /// Fade time for a stolen voice, in milliseconds.
    pub fn steal_release_ms(&self) -> f32 {
        self.steal_release_ms
    }

    /// All voices.
    pub fn voices(&self) -> &[Voice; N] {
        &self.voices
    }

    /// All voices, mutably.
    pub fn voices_mut(&mut self) -> &mut [Voice; N] {
        &mut self.voices
    }

    /// Held notes in mono and unison modes.
    pub fn note_stack(&self) -> &NoteStack {
        &self.stack
    }

    /// Voices producing sound.
    pub fn active_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_sounding()).count()
    }

    /// True when no voice produces sound.
    pub fn is_idle(&self) -> bool {
        !self.voices.iter().any(Voice::is_sounding)
    }

    /// Start `note` at `velocity` (0.0 to 1.0).
    pub fn note_on(&mut self, note: u8, velocity: f32) -> NoteOnOutcome {
        self.age_counter += 1;
        match self.mode {
            SynthMode::Poly => self.poly_note_on(note, velocity),
            SynthMode::Mono | SynthMode::Unison => self.mono_note_on(note, velocity),
        }
    }

    /// Release `note`.
    pub fn note_off(&mut self, note: u8) {
        match self.mode {
            SynthMode::Poly => {
                for voice in &mut self.voices {
                    if voice.is_gated() && voice.held_note() == note {
                        voice.release();
                    }
                }
            }
            SynthMode::Mono | SynthMode::Unison => self.mono_note_off(note),
        }
    }

    /// Release every voice and forget held and pending notes.
    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            if voice.is_gated() {
                voice.release();
            }
        }
        self.stack.clear();
    }

    /// Silence and clear every voice.
    pub fn reset(&mut self) {
        for voice in &mut self.voices {
            voice.reset();
        }
        self.stack.clear();
        self.age_counter = 0;
        self.round_robin_idx = 0;
    }

    fn poly_note_on(&mut self, note: u8, velocity: f32) -> NoteOnOutcome {
        let age = self.age_counter;
        let pending = self.pending(note, velocity, age);

        if let Some(idx) = self
            .voices
            .iter()
            .position(|v| v.is_gated() && v.held_note() == note)
        {
            let voice = &mut self.voices[idx];
            if voice.pending().is_some() {
                voice.steal(pending, self.steal_release_ms);
            } else {
                voice.start(note, velocity, age, self.glide_rate, true);
            }
            return NoteOnOutcome {
                voice: idx,
                retriggered: true,
                stolen: false,
            };
        }

        if let Some(idx) = self.find_free_voice() {
            self.voices[idx].start(note, velocity, age, self.glide_rate, true);
            return NoteOnOutcome {
                voice: idx,
                retriggered: true,
                stolen: false,
            };
        }

        let idx = self.find_steal_victim();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            voice = idx,
            victim = self.voices[idx].note(),
            note,
            "voice stolen"
        );
        self.voices[idx].steal(pending, self.steal_release_ms);
        NoteOnOutcome {
            voice: idx,
            retriggered: true,
            stolen: true,
        }
    }

    fn pending(&self, note: u8, velocity: f32, age: u64) -> PendingNote {
        PendingNote {
            note,
            velocity,
            age,
            glide_rate: self.glide_rate,
        }
    }

    fn find_free_voice(&mut self) -> Option<usize> {
        match self.strategy {
            AllocationStrategy::OldestNote => self
                .voices
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_sounding())
                .min_by_key(|(_, v)| v.age())
                .map(|(i, _)| i),
            AllocationStrategy::FirstAvailable => self.voices.iter().position(|v| !v.is_sounding()),
            AllocationStrategy::RoundRobin => {
                let found = (0..N)
                    .map(|offset| (self.round_robin_idx + offset) % N)
                    .find(|&i| !self.voices[i].is_sounding());
                if let Some(i) = found {
                    self.round_robin_idx = (i + 1) % N;
                }
                found
            }
        }
    }

    fn find_steal_victim(&self) -> usize {
        let oldest = |releasing: bool| {
            self.voices
                .iter()
                .enumerate()
                .filter(|(_, v)| !releasing || v.is_releasing())
                .min_by_key(|(_, v)| v.age())
                .map(|(i, _)| i)
        };
        oldest(true).or_else(|| oldest(false)).unwrap_or(0)
    }

    fn mono_note_on(&mut self, note: u8, velocity: f32) -> NoteOnOutcome {
        let age = self.age_counter;
        let glide_rate = self.glide_rate;
        let legato = !self.stack.is_empty();
        self.stack.push(note, velocity);

        let Some(voice) = self.voices.first_mut() else {
            return NoteOnOutcome {
                voice: 0,
                retriggered: false,
                stolen: false,
            };
        };
        if legato && glide_rate > 0.0 && voice.is_gated() {
            voice.glide_to(note, glide_rate);
            NoteOnOutcome {
                voice: 0,
                retriggered: false,
                stolen: false,
            }
        } else {
            voice.start(note, velocity, age, glide_rate, true);
            NoteOnOutcome {
                voice: 0,
                retriggered: true,
                stolen: false,
            }
        }
    }

    fn mono_note_off(&mut self, note: u8) {
        if !self.stack.remove(note) {
            return;
        }
        let glide_rate = self.glide_rate;
        let top = self.stack.top();
        let Some(voice) = self.voices.first_mut() else {
            return;
        };
        if !voice.is_gated() || voice.note() != note {
            return;
        }
        match top {
            Some((previous, _)) => voice.glide_to(previous, glide_rate),
            None => voice.release(),
        }
    }
}
