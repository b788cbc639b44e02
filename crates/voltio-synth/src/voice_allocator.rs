//! Polyphonic voice assignment with least-recently-used stealing.
//!
//! Maps incoming notes onto a small fixed pool of voices. The allocation
//! rules, in order:
//!
//! 1. A voice already sounding the note is reused — re-triggering a note
//!    always hits the same physical voice, which is what makes legato and
//!    portamento behave.
//! 2. Otherwise the least-recently-touched *inactive* voice is taken, so
//!    release tails survive as long as possible.
//! 3. Otherwise the least-recently-touched active voice is stolen.
//!
//! Releasing a note keeps the voice assigned (its release stage is still
//! audible) and refreshes its recency, so a just-released voice is not the
//! immediate steal target.
//!
//! The pool size can be lowered at runtime below the compile-time
//! capacity (unison modes, voice-count settings); with a pool size of
//! zero, allocation returns [`NOT_ALLOCATED`], which callers must check.

/// Sentinel returned when no voice can be allocated or found.
pub const NOT_ALLOCATED: usize = usize::MAX;

#[derive(Debug, Clone, Copy, Default)]
struct VoiceSlot {
    note: u8,
    active: bool,
}

/// Fixed-pool LRU voice allocator.
///
/// # Example
///
/// ```rust
/// use voltio_synth::{NOT_ALLOCATED, VoiceAllocator};
///
/// let mut allocator: VoiceAllocator<4> = VoiceAllocator::new();
/// let a = allocator.note_on(60);
/// let b = allocator.note_on(64);
/// assert_ne!(a, b);
/// // Same note, same voice:
/// assert_eq!(allocator.note_on(60), a);
/// assert_ne!(a, NOT_ALLOCATED);
/// ```
#[derive(Debug, Clone)]
pub struct VoiceAllocator<const N: usize> {
    voices: [VoiceSlot; N],
    /// Voice indices, most recently touched first.
    lru: [u8; N],
    size: usize,
}

impl<const N: usize> Default for VoiceAllocator<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> VoiceAllocator<N> {
    /// Create an allocator with the full pool enabled.
    ///
    /// # Panics
    ///
    /// Panics unless `1 <= N <= 255`.
    pub fn new() -> Self {
        assert!(N >= 1 && N <= 255);
        Self {
            voices: [VoiceSlot::default(); N],
            lru: core::array::from_fn(|i| i as u8),
            size: N,
        }
    }

    /// Current pool size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Compile-time capacity.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Restrict the pool to the first `size` voices (clamped to the
    /// capacity). Voices beyond the new size keep their state but are
    /// never allocated.
    pub fn set_size(&mut self, size: usize) {
        self.size = size.min(N);
    }

    /// Assign a voice for `note`.
    ///
    /// Returns the voice index, or [`NOT_ALLOCATED`] when the pool size is
    /// zero — callers must check before using the result.
    pub fn note_on(&mut self, note: u8) -> usize {
        if self.size == 0 {
            return NOT_ALLOCATED;
        }

        // Rule 1: the voice already sounding this note.
        let mut choice = self.find(note);

        // Rule 2: the least-recently-touched inactive voice.
        if choice == NOT_ALLOCATED {
            for &candidate in self.lru.iter().rev() {
                let candidate = candidate as usize;
                if candidate < self.size && !self.voices[candidate].active {
                    choice = candidate;
                    break;
                }
            }
        }

        // Rule 3: steal the least-recently-touched voice in the pool.
        if choice == NOT_ALLOCATED {
            for &candidate in self.lru.iter().rev() {
                let candidate = candidate as usize;
                if candidate < self.size {
                    choice = candidate;
                    break;
                }
            }
        }

        self.voices[choice] = VoiceSlot { note, active: true };
        self.touch(choice);
        choice
    }

    /// Mark the voice sounding `note` as released.
    ///
    /// The assignment is kept (the release stage still reads it) and the
    /// voice's recency is refreshed so it is not the next steal target.
    pub fn note_off(&mut self, note: u8) {
        let voice = self.find(note);
        if voice != NOT_ALLOCATED {
            self.voices[voice].active = false;
            self.touch(voice);
        }
    }

    /// The voice currently sounding `note` (gate still high), or
    /// [`NOT_ALLOCATED`].
    pub fn find(&self, note: u8) -> usize {
        for voice in 0..self.size {
            if self.voices[voice].active && self.voices[voice].note == note {
                return voice;
            }
        }
        NOT_ALLOCATED
    }

    /// The note assigned to a voice (meaningful for active voices and
    /// release tails alike).
    pub fn note(&self, voice: usize) -> u8 {
        self.voices[voice].note
    }

    /// Whether a voice's gate is high.
    pub fn active(&self, voice: usize) -> bool {
        self.voices[voice].active
    }

    /// Release every voice and restore the initial recency order.
    pub fn reset(&mut self) {
        self.voices = [VoiceSlot::default(); N];
        self.lru = core::array::from_fn(|i| i as u8);
    }

    /// Move a voice to the front of the recency order.
    fn touch(&mut self, voice: usize) {
        let mut i = self
            .lru
            .iter()
            .position(|&v| v as usize == voice)
            .unwrap_or(N - 1);
        while i > 0 {
            self.lru[i] = self.lru[i - 1];
            i -= 1;
        }
        self.lru[0] = voice as u8;
    }
}
