//! Held-note tracking for monophonic key assignment.
//!
//! Tracks the currently held keys in two orders at once: press order (a
//! singly linked list threaded through a fixed arena of nodes) and pitch
//! order (an incrementally maintained sorted index array). Monosynth
//! priority queries — last played, lowest, highest — are then all O(1).
//!
//! # Arena
//!
//! Nodes live in a preallocated pool addressed by 1-based integer handles,
//! with 0 reserved as "none"; freed nodes are chained into a free list
//! through the same `next` links. No allocation, no pointer lifetimes,
//! bounded O(capacity) work per operation.
//!
//! # Exhaustion
//!
//! A `note_on` at capacity evicts the *least recently played* note rather
//! than rejecting the new one — on a keyboard, the note the player most
//! recently committed to always wins.

/// One held note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteEntry {
    /// MIDI-style note number.
    pub note: u8,
    /// Key velocity.
    pub velocity: u8,
}

/// Monophonic note priority.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NotePriority {
    /// Most recently played note wins.
    #[default]
    Last,
    /// Lowest pitch wins.
    Low,
    /// Highest pitch wins.
    High,
}

/// Returned by queries on an empty stack: a well-defined, musically inert
/// entry rather than a failure.
const DUMMY: NoteEntry = NoteEntry {
    note: 0,
    velocity: 0,
};

/// Fixed-capacity held-note stack.
///
/// # Example
///
/// ```rust
/// use voltio_synth::{NotePriority, NoteStack};
///
/// let mut stack: NoteStack<10> = NoteStack::new();
/// stack.note_on(60, 100);
/// stack.note_on(67, 90);
/// stack.note_on(64, 80);
///
/// assert_eq!(stack.note_by_priority(NotePriority::Last).note, 64);
/// assert_eq!(stack.note_by_priority(NotePriority::Low).note, 60);
/// assert_eq!(stack.note_by_priority(NotePriority::High).note, 67);
/// ```
#[derive(Debug, Clone)]
pub struct NoteStack<const N: usize> {
    pool: [NoteEntry; N],
    /// Handle of the next node: press-order chain for live nodes, free
    /// chain for the rest. 0 terminates both.
    next: [u8; N],
    /// Most recently played live handle, 0 when empty.
    head: u8,
    /// First free handle, 0 when full.
    free_head: u8,
    /// Live handles in ascending note order.
    sorted: [u8; N],
    size: usize,
}

impl<const N: usize> Default for NoteStack<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> NoteStack<N> {
    /// Create an empty stack.
    ///
    /// # Panics
    ///
    /// Panics unless `1 <= N <= 255` (handles are `u8`, 0 is reserved).
    pub fn new() -> Self {
        assert!(N >= 1 && N <= 255);
        let mut stack = Self {
            pool: [NoteEntry::default(); N],
            next: [0; N],
            head: 0,
            free_head: 1,
            sorted: [0; N],
            size: 0,
        };
        // Chain every node into the free list: 1 -> 2 -> ... -> N -> 0.
        for slot in 0..N - 1 {
            stack.next[slot] = (slot + 2) as u8;
        }
        stack.next[N - 1] = 0;
        stack
    }

    /// Number of currently held notes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Capacity of the stack.
    pub const fn max_size(&self) -> usize {
        N
    }

    /// True when no notes are held.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Press a key.
    ///
    /// Re-pressing a held note replaces it (and moves it to the front of
    /// the press order); at capacity, the least recently played note is
    /// evicted first.
    pub fn note_on(&mut self, note: u8, velocity: u8) {
        self.note_off(note);
        if self.size == N {
            let oldest = self.least_recent_note().note;
            self.note_off(oldest);
        }

        let handle = self.free_head;
        debug_assert!(handle != 0);
        let slot = (handle - 1) as usize;
        self.free_head = self.next[slot];

        self.pool[slot] = NoteEntry { note, velocity };
        self.next[slot] = self.head;
        self.head = handle;

        // Ordered insertion into the pitch-sorted array.
        let mut position = 0;
        while position < self.size && self.pool[(self.sorted[position] - 1) as usize].note < note {
            position += 1;
        }
        let mut i = self.size;
        while i > position {
            self.sorted[i] = self.sorted[i - 1];
            i -= 1;
        }
        self.sorted[position] = handle;
        self.size += 1;
    }

    /// Release a key. Returns true if the note was held.
    pub fn note_off(&mut self, note: u8) -> bool {
        // Find the node and its predecessor in the press-order chain.
        let mut prev = 0u8;
        let mut handle = self.head;
        while handle != 0 && self.pool[(handle - 1) as usize].note != note {
            prev = handle;
            handle = self.next[(handle - 1) as usize];
        }
        if handle == 0 {
            return false;
        }
        let slot = (handle - 1) as usize;

        // Unlink from the press-order chain.
        if prev == 0 {
            self.head = self.next[slot];
        } else {
            self.next[(prev - 1) as usize] = self.next[slot];
        }

        // Return the node to the free list.
        self.next[slot] = self.free_head;
        self.free_head = handle;
        self.pool[slot] = NoteEntry::default();

        // Remove from the sorted array, preserving order.
        let mut position = 0;
        while self.sorted[position] != handle {
            position += 1;
        }
        while position + 1 < self.size {
            self.sorted[position] = self.sorted[position + 1];
            position += 1;
        }
        self.size -= 1;
        true
    }

    /// Release everything.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// The most recently played note, or the dummy entry when empty.
    pub fn most_recent_note(&self) -> NoteEntry {
        if self.head == 0 {
            DUMMY
        } else {
            self.pool[(self.head - 1) as usize]
        }
    }

    /// The least recently played note (tail of the press order), or the
    /// dummy entry when empty. O(capacity).
    pub fn least_recent_note(&self) -> NoteEntry {
        if self.head == 0 {
            return DUMMY;
        }
        let mut handle = self.head;
        while self.next[(handle - 1) as usize] != 0 {
            handle = self.next[(handle - 1) as usize];
        }
        self.pool[(handle - 1) as usize]
    }

    /// The i-th held note in ascending pitch order, or the dummy entry
    /// when out of range.
    pub fn sorted_note(&self, i: usize) -> NoteEntry {
        if i < self.size {
            self.pool[(self.sorted[i] - 1) as usize]
        } else {
            DUMMY
        }
    }

    /// The note a monosynth should play under the given priority rule.
    pub fn note_by_priority(&self, priority: NotePriority) -> NoteEntry {
        if self.size == 0 {
            return DUMMY;
        }
        match priority {
            NotePriority::Last => self.most_recent_note(),
            NotePriority::Low => self.sorted_note(0),
            NotePriority::High => self.sorted_note(self.size - 1),
        }
    }
}
