//! Plain persisted-state structs.
//!
//! The storage layer (flash, NVRAM, a host's preset system) owns the
//! serialization format; this core only reads these structs at
//! construction time and writes them back verbatim on save. They are
//! deliberately plain old data — no methods with side effects, no
//! invariant enforcement beyond what the consuming module clamps for
//! itself.
//!
//! With the `serde` feature enabled every struct derives
//! `Serialize`/`Deserialize` so a std host can round-trip presets through
//! any serde format.

use crate::envelope::{EnvelopeShape, MAX_SEGMENTS};
use crate::note_stack::NotePriority;

/// Per-channel calibration for raw control inputs.
///
/// Maps an ADC code or CV reading onto the unit it represents:
/// `calibrated = raw * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationSettings {
    /// Additive trim.
    pub offset: f32,
    /// Multiplicative trim.
    pub scale: f32,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            offset: 0.0,
            scale: 1.0,
        }
    }
}

impl CalibrationSettings {
    /// Apply the calibration to a raw reading.
    #[inline]
    pub fn apply(&self, raw: f32) -> f32 {
        raw * self.scale + self.offset
    }
}

/// A complete multistage-envelope segment layout.
///
/// Consumed by [`crate::MultistageEnvelope::configure`], which clamps any
/// out-of-range index instead of rejecting the struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvelopeSettings {
    /// Number of active segments (1 to [`MAX_SEGMENTS`]).
    pub num_segments: usize,
    /// Segment boundary levels; entry `i` is where segment `i` starts,
    /// entry `num_segments` is the final target.
    pub levels: [u16; MAX_SEGMENTS + 1],
    /// Per-segment time parameters.
    pub times: [u16; MAX_SEGMENTS],
    /// Per-segment response curves.
    pub shapes: [EnvelopeShape; MAX_SEGMENTS],
    /// Segment held while the gate is high; 0 = none.
    pub sustain_point: usize,
    /// First segment of the loop range.
    pub loop_start: usize,
    /// Segment index that wraps back to `loop_start`; 0 = no loop.
    pub loop_end: usize,
}

impl Default for EnvelopeSettings {
    /// A plain AD shape, matching
    /// [`MultistageEnvelope::new`](crate::MultistageEnvelope::new).
    fn default() -> Self {
        let mut levels = [0; MAX_SEGMENTS + 1];
        levels[1] = 65535;
        let mut times = [0; MAX_SEGMENTS];
        times[0] = 8192;
        times[1] = 24576;
        let mut shapes = [EnvelopeShape::Linear; MAX_SEGMENTS];
        shapes[1] = EnvelopeShape::Expo;
        Self {
            num_segments: 2,
            levels,
            times,
            shapes,
            sustain_point: 0,
            loop_start: 0,
            loop_end: 0,
        }
    }
}

/// Key-assignment configuration for a module's voicing section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoicingSettings {
    /// Monophonic priority rule.
    pub priority: NotePriority,
    /// Polyphonic voice count (consumed by
    /// [`crate::VoiceAllocator::set_size`]).
    pub voices: usize,
}

impl Default for VoicingSettings {
    fn default() -> Self {
        Self {
            priority: NotePriority::Last,
            voices: 8,
        }
    }
}
