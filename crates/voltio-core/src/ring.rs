//! Fixed-capacity circular buffer for audio-block and event hand-off.
//!
//! A ring with separate read and write cursors and one slot permanently
//! kept empty, so that full and empty states stay distinguishable:
//! `readable() + writable() == N - 1` at all times.
//!
//! # Cursor discipline
//!
//! Every operation advances exactly one cursor — writes touch the write
//! cursor, reads touch the read cursor ([`RingBuffer::overwrite`] is the
//! one exception: when it laps the consumer it also pushes the read cursor
//! forward to drop the oldest element). This is the classic SPSC layout.
//! Within this crate both sides run synchronously from the owning context;
//! an embedding that genuinely splits producer and consumer across
//! execution contexts wraps the buffer in its platform's cell or
//! critical-section type at the driver layer.
//!
//! # Blocking
//!
//! [`RingBuffer::write`] and [`RingBuffer::read`] busy-spin until the
//! operation can proceed and are reserved for call sites off the real-time
//! path (preloading, test harnesses). The audio path uses
//! [`RingBuffer::overwrite`] / [`RingBuffer::immediate_read`], which never
//! block.
//!
//! # Capacity 0
//!
//! `RingBuffer<T, 0>` is a valid specialization that behaves as a no-op
//! sink: writes vanish, reads return `None`, counts are zero. Useful for
//! compiling out an optional tap point without touching call sites.

/// Fixed-capacity ring buffer holding up to `N - 1` elements.
///
/// `N` is the backing array length; one slot stays empty to disambiguate
/// full from empty.
#[derive(Debug, Clone)]
pub struct RingBuffer<T, const N: usize> {
    buffer: [T; N],
    write: usize,
    read: usize,
}

impl<T: Copy + Default, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default, const N: usize> RingBuffer<T, N> {
    /// Create an empty ring buffer.
    pub fn new() -> Self {
        Self {
            buffer: [T::default(); N],
            write: 0,
            read: 0,
        }
    }

    /// Number of elements the buffer can hold (`N - 1`).
    pub const fn capacity(&self) -> usize {
        if N == 0 { 0 } else { N - 1 }
    }

    /// Number of elements that can be written without overwriting.
    #[inline]
    pub fn writable(&self) -> usize {
        if N == 0 {
            0
        } else {
            (self.read + N - self.write - 1) % N
        }
    }

    /// Number of elements available to read.
    #[inline]
    pub fn readable(&self) -> usize {
        if N == 0 {
            0
        } else {
            (self.write + N - self.read) % N
        }
    }

    /// Write one element, spinning until space is available.
    ///
    /// Off-the-real-time-path only: with no concurrent consumer draining
    /// the buffer, calling this on a full ring spins forever. Check
    /// [`Self::writable`] first when in doubt, or use [`Self::overwrite`].
    pub fn write(&mut self, value: T) {
        if N == 0 {
            return;
        }
        while self.writable() == 0 {
            core::hint::spin_loop();
        }
        self.buffer[self.write] = value;
        self.write = (self.write + 1) % N;
    }

    /// Write one element without blocking, dropping the oldest unread
    /// element when the buffer is full.
    ///
    /// The write cursor always advances; at most `N - 1` elements stay
    /// live, and the survivors are the freshest ones in FIFO order.
    #[inline]
    pub fn overwrite(&mut self, value: T) {
        if N == 0 {
            return;
        }
        self.buffer[self.write] = value;
        self.write = (self.write + 1) % N;
        if self.write == self.read {
            self.read = (self.read + 1) % N;
        }
    }

    /// Bulk [`Self::overwrite`] of a slice, in order.
    pub fn overwrite_slice(&mut self, values: &[T]) {
        for &value in values {
            self.overwrite(value);
        }
    }

    /// Read one element, spinning until one is available.
    ///
    /// Same contract as [`Self::write`]: reserved for call sites off the
    /// real-time path.
    pub fn read(&mut self) -> T {
        loop {
            if let Some(value) = self.immediate_read() {
                return value;
            }
            core::hint::spin_loop();
        }
    }

    /// Read one element without blocking; `None` when the buffer is empty.
    #[inline]
    pub fn immediate_read(&mut self) -> Option<T> {
        if N == 0 || self.readable() == 0 {
            return None;
        }
        let value = self.buffer[self.read];
        self.read = (self.read + 1) % N;
        Some(value)
    }

    /// Bulk non-blocking read into `dest`; returns the number of elements
    /// actually transferred (≤ `dest.len()`).
    pub fn immediate_read_slice(&mut self, dest: &mut [T]) -> usize {
        let count = self.readable().min(dest.len());
        for slot in &mut dest[..count] {
            // readable() >= count, so the pop cannot fail.
            *slot = self.immediate_read().unwrap_or_default();
        }
        count
    }

    /// Discard everything currently readable.
    pub fn flush(&mut self) {
        self.read = self.write;
    }
}
