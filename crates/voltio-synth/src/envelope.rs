//! Multistage segment envelope with fixed-point phase.
//!
//! Up to eight segments, each with its own target level, time and response
//! curve, plus an optional sustain point and loop range. The classic
//! two-to-four stage shapes (AD, AR, ADSR, ADR, looping AD) are provided
//! as one-call configuration helpers.
//!
//! # Phase representation
//!
//! Segment phase is a `u32` with 24 fractional bits; the per-sample
//! increment comes from the duration table in [`crate::tables`]. A segment
//! is complete when the phase addition carries — no comparison against an
//! end value, so segment duration is exact modulo increment rounding, and
//! a sustain segment simply runs with increment zero.
//!
//! # Gate semantics
//!
//! - Rising edge: restart at segment 0. The new segment begins from the
//!   current output level so retriggers never click; in hard-reset mode
//!   (and from the terminal state) it snaps to the configured start level
//!   instead.
//! - Falling edge: when a sustain point is configured, jump straight to
//!   the sustain segment, which then runs as the release since the gate is
//!   low.
//! - Terminal state (`segment == num_segments`): output frozen until the
//!   next rising edge.

use crate::settings::EnvelopeSettings;
use crate::tables::EnvelopeTables;
use voltio_core::{clip_u16, interpolate_u16_q24};

/// Maximum number of segments in one envelope.
pub const MAX_SEGMENTS: usize = 8;

/// Response curve of one envelope segment.
///
/// Resolved once per segment change, not per sample — the per-sample work
/// is a single table interpolation regardless of shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EnvelopeShape {
    /// Straight line from start to target.
    #[default]
    Linear,
    /// Exponential approach — fast start, asymptotic finish.
    Expo,
    /// Quartic curve — slow start, accelerating finish.
    Quartic,
}

/// Multi-segment envelope generator, 16-bit output.
///
/// # Example
///
/// ```rust
/// use voltio_synth::{EnvelopeTables, MultistageEnvelope};
///
/// let tables = EnvelopeTables::new(48000.0);
/// let mut env = MultistageEnvelope::new();
/// env.set_adsr(8192, 16384, 40000, 24576);
///
/// env.gate(true);
/// for _ in 0..64 {
///     let _level = env.process(&tables);
/// }
/// env.gate(false);
/// ```
#[derive(Debug, Clone)]
pub struct MultistageEnvelope {
    level: [u16; MAX_SEGMENTS + 1],
    time: [u16; MAX_SEGMENTS],
    shape: [EnvelopeShape; MAX_SEGMENTS],
    num_segments: usize,
    /// Segment frozen while the gate is high; 0 = none.
    sustain_point: usize,
    loop_start: usize,
    /// Segment index that wraps back to `loop_start`; 0 = no loop.
    loop_end: usize,
    hard_reset: bool,

    segment: usize,
    phase: u32,
    start_value: u16,
    value: u16,
    gate: bool,
}

impl Default for MultistageEnvelope {
    fn default() -> Self {
        Self::new()
    }
}

impl MultistageEnvelope {
    /// Create an envelope configured as a medium AD shape.
    pub fn new() -> Self {
        let mut env = Self {
            level: [0; MAX_SEGMENTS + 1],
            time: [0; MAX_SEGMENTS],
            shape: [EnvelopeShape::Linear; MAX_SEGMENTS],
            num_segments: 0,
            sustain_point: 0,
            loop_start: 0,
            loop_end: 0,
            hard_reset: false,
            segment: 0,
            phase: 0,
            start_value: 0,
            value: 0,
            gate: false,
        };
        env.set_ad(8192, 24576);
        env.segment = env.num_segments;
        env
    }

    /// Attack-decay: one-shot rise to full scale and fall back to zero.
    pub fn set_ad(&mut self, attack: u16, decay: u16) {
        self.num_segments = 2;
        self.sustain_point = 0;
        self.loop_start = 0;
        self.loop_end = 0;
        self.level[0] = 0;
        self.level[1] = 65535;
        self.level[2] = 0;
        self.time[0] = attack;
        self.time[1] = decay;
        self.shape[0] = EnvelopeShape::Linear;
        self.shape[1] = EnvelopeShape::Expo;
        self.after_reconfigure();
    }

    /// Attack-release: rise to full scale, hold while the gate is high,
    /// release on the falling edge.
    pub fn set_ar(&mut self, attack: u16, release: u16) {
        self.num_segments = 2;
        self.sustain_point = 1;
        self.loop_start = 0;
        self.loop_end = 0;
        self.level[0] = 0;
        self.level[1] = 65535;
        self.level[2] = 0;
        self.time[0] = attack;
        self.time[1] = release;
        self.shape[0] = EnvelopeShape::Linear;
        self.shape[1] = EnvelopeShape::Expo;
        self.after_reconfigure();
    }

    /// Full ADSR: `sustain` is a 16-bit level, held while the gate is high.
    pub fn set_adsr(&mut self, attack: u16, decay: u16, sustain: u16, release: u16) {
        self.num_segments = 3;
        self.sustain_point = 2;
        self.loop_start = 0;
        self.loop_end = 0;
        self.level[0] = 0;
        self.level[1] = 65535;
        self.level[2] = sustain;
        self.level[3] = 0;
        self.time[0] = attack;
        self.time[1] = decay;
        self.time[2] = release;
        self.shape[0] = EnvelopeShape::Linear;
        self.shape[1] = EnvelopeShape::Expo;
        self.shape[2] = EnvelopeShape::Expo;
        self.after_reconfigure();
    }

    /// Attack-decay-release without a hold: passes through the `sustain`
    /// level but never waits for the gate.
    pub fn set_adr(&mut self, attack: u16, decay: u16, sustain: u16, release: u16) {
        self.set_adsr(attack, decay, sustain, release);
        self.sustain_point = 0;
    }

    /// Looping attack-decay: cycles for as long as the envelope runs,
    /// turning it into a shaped LFO.
    pub fn set_ad_loop(&mut self, attack: u16, decay: u16) {
        self.set_ad(attack, decay);
        self.loop_start = 0;
        self.loop_end = 2;
        self.after_reconfigure();
    }

    /// Load a segment layout from a persisted settings struct.
    ///
    /// Out-of-range indices in the settings are clamped rather than
    /// rejected: the storage layer is trusted to be well-formed, and a
    /// corrupted value must still produce a usable envelope.
    pub fn configure(&mut self, settings: &EnvelopeSettings) {
        let n = settings.num_segments.clamp(1, MAX_SEGMENTS);
        self.num_segments = n;
        self.level[..=n].copy_from_slice(&settings.levels[..=n]);
        self.time[..n].copy_from_slice(&settings.times[..n]);
        self.shape[..n].copy_from_slice(&settings.shapes[..n]);
        self.sustain_point = if settings.sustain_point < n {
            settings.sustain_point
        } else {
            0
        };
        if settings.loop_end != 0 && settings.loop_end <= n && settings.loop_start < settings.loop_end
        {
            self.loop_start = settings.loop_start;
            self.loop_end = settings.loop_end;
        } else {
            self.loop_start = 0;
            self.loop_end = 0;
        }
        self.after_reconfigure();
    }

    /// In hard-reset mode a rising edge always restarts from the declared
    /// first level instead of the current output.
    pub fn set_hard_reset(&mut self, hard_reset: bool) {
        self.hard_reset = hard_reset;
    }

    /// Update the gate and handle its edges.
    ///
    /// Call once per control-rate tick, before rendering the block.
    pub fn gate(&mut self, high: bool) {
        if high && !self.gate {
            self.start_value = if self.segment == self.num_segments || self.hard_reset {
                self.level[0]
            } else {
                self.value
            };
            self.segment = 0;
            self.phase = 0;
        } else if !high && self.gate && self.sustain_point != 0 {
            self.start_value = self.value;
            self.segment = self.sustain_point;
            self.phase = 0;
        }
        self.gate = high;
    }

    /// Advance one sample and return the current 16-bit level.
    #[inline]
    pub fn process(&mut self, tables: &EnvelopeTables) -> u16 {
        if self.segment == self.num_segments {
            return self.value;
        }

        let sustained = self.sustain_point != 0 && self.segment == self.sustain_point && self.gate;
        let increment = if sustained {
            0
        } else {
            tables.increment(self.time[self.segment])
        };

        let scale = i64::from(interpolate_u16_q24(
            tables.shape(self.shape[self.segment]),
            self.phase,
        ));
        let start = i64::from(self.start_value);
        let target = i64::from(self.level[self.segment + 1]);
        self.value = clip_u16((start + (((target - start) * scale) >> 16)) as i32);

        let (next_phase, carry) = self.phase.overflowing_add(increment);
        self.phase = next_phase;
        if carry {
            self.start_value = self.level[self.segment + 1];
            self.segment += 1;
            self.phase = 0;
            if self.loop_end != 0 && self.segment == self.loop_end {
                self.segment = self.loop_start;
            }
        }

        self.value
    }

    /// Render a block of envelope levels.
    pub fn render(&mut self, tables: &EnvelopeTables, out: &mut [u16]) {
        for slot in out.iter_mut() {
            *slot = self.process(tables);
        }
    }

    /// Current output level without advancing.
    pub fn value(&self) -> u16 {
        self.value
    }

    /// True once the final segment has completed (output frozen).
    pub fn is_done(&self) -> bool {
        self.segment == self.num_segments
    }

    /// Number of configured segments.
    pub fn num_segments(&self) -> usize {
        self.num_segments
    }

    fn after_reconfigure(&mut self) {
        if self.segment > self.num_segments {
            self.segment = self.num_segments;
            self.phase = 0;
        }
    }
}
