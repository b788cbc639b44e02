//! Lookup tables for the multistage envelope.
//!
//! The envelope reads two kinds of tables per sample: a shape table that
//! maps segment phase to a response curve (linear, exponential, quartic),
//! and a duration table that maps the 16-bit "time" parameter to a phase
//! increment. Time scaling is exponential, so a knob sweep feels even from
//! a millisecond pluck to a multi-second pad.
//!
//! Tables are owned by an [`EnvelopeTables`] value built once at
//! initialization and passed by reference into the envelope's render calls.
//! Nothing here is global: several modules at different sample rates can
//! coexist, and tests can construct their own bank.
//!
//! All tables carry a trailing guard entry (see `voltio_core::lut`), so a
//! full-scale 8.24 phase can always read its bracketing pair.

use crate::envelope::EnvelopeShape;
use libm::{expf, logf};

/// Number of entries per table: 256 steps plus one guard.
pub const TABLE_LEN: usize = 257;

/// Shortest representable segment duration, seconds.
const MIN_SEGMENT_TIME: f32 = 0.001;
/// Longest representable segment duration, seconds.
const MAX_SEGMENT_TIME: f32 = 8.0;

/// Precomputed shape and duration tables for [`crate::MultistageEnvelope`].
#[derive(Debug, Clone)]
pub struct EnvelopeTables {
    linear: [u16; TABLE_LEN],
    expo: [u16; TABLE_LEN],
    quartic: [u16; TABLE_LEN],
    increments: [u32; TABLE_LEN],
}

impl EnvelopeTables {
    /// Build the table bank for the given sample rate.
    ///
    /// # Panics
    ///
    /// Panics if `sample_rate` is not a positive, audio-plausible rate
    /// (at least 1 kHz — below that the shortest segment duration would
    /// not be representable).
    pub fn new(sample_rate: f32) -> Self {
        assert!(sample_rate >= 1000.0, "sample rate too low: {sample_rate}");

        let mut tables = Self {
            linear: [0; TABLE_LEN],
            expo: [0; TABLE_LEN],
            quartic: [0; TABLE_LEN],
            increments: [0; TABLE_LEN],
        };

        // Exponential curve normalized to reach full scale at x = 1.
        let expo_span = 1.0 - expf(-4.0);
        let time_ratio = logf(MAX_SEGMENT_TIME / MIN_SEGMENT_TIME);

        for i in 0..TABLE_LEN {
            let x = i as f32 / 256.0;

            tables.linear[i] = (x * 65535.0) as u16;
            tables.expo[i] = ((1.0 - expf(-4.0 * x)) / expo_span * 65535.0) as u16;
            let x2 = x * x;
            tables.quartic[i] = (x2 * x2 * 65535.0) as u16;

            let seconds = MIN_SEGMENT_TIME * expf(x * time_ratio);
            let samples = (seconds * sample_rate).max(2.0);
            tables.increments[i] = (4_294_967_296.0 / samples) as u32;
        }

        tables
    }

    /// The shape table for one response curve.
    #[inline]
    pub fn shape(&self, shape: EnvelopeShape) -> &[u16; TABLE_LEN] {
        match shape {
            EnvelopeShape::Linear => &self.linear,
            EnvelopeShape::Expo => &self.expo,
            EnvelopeShape::Quartic => &self.quartic,
        }
    }

    /// Phase increment for a 16-bit time parameter.
    ///
    /// Interpolates between adjacent duration steps so the time response
    /// has no audible staircase. Larger `time` means a longer segment,
    /// hence a smaller increment.
    #[inline]
    pub fn increment(&self, time: u16) -> u32 {
        let integral = (time >> 8) as usize;
        let fractional = i64::from(time & 0xff);
        let a = i64::from(self.increments[integral]);
        let b = i64::from(self.increments[integral + 1]);
        (a + (((b - a) * fractional) >> 8)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_tables_span_full_scale() {
        let tables = EnvelopeTables::new(48000.0);
        for shape in [
            EnvelopeShape::Linear,
            EnvelopeShape::Expo,
            EnvelopeShape::Quartic,
        ] {
            let table = tables.shape(shape);
            assert_eq!(table[0], 0, "{shape:?} must start at zero");
            assert_eq!(table[256], 65535, "{shape:?} must end at full scale");
        }
    }

    #[test]
    fn test_shape_tables_monotonic() {
        let tables = EnvelopeTables::new(48000.0);
        for shape in [
            EnvelopeShape::Linear,
            EnvelopeShape::Expo,
            EnvelopeShape::Quartic,
        ] {
            let table = tables.shape(shape);
            for i in 1..TABLE_LEN {
                assert!(
                    table[i] >= table[i - 1],
                    "{shape:?} not monotonic at {i}: {} < {}",
                    table[i],
                    table[i - 1]
                );
            }
        }
    }

    #[test]
    fn test_expo_is_faster_than_linear_early() {
        let tables = EnvelopeTables::new(48000.0);
        // Exponential rises fastest at the start, quartic slowest.
        let quarter = 64;
        assert!(tables.expo[quarter] > tables.linear[quarter]);
        assert!(tables.quartic[quarter] < tables.linear[quarter]);
    }

    #[test]
    fn test_increments_monotonically_decreasing() {
        let tables = EnvelopeTables::new(48000.0);
        for i in 1..TABLE_LEN {
            assert!(
                tables.increments[i] <= tables.increments[i - 1],
                "longer time must not speed the phase up (index {i})"
            );
        }
    }

    #[test]
    fn test_increment_matches_expected_durations() {
        let sample_rate = 48000.0;
        let tables = EnvelopeTables::new(sample_rate);

        // time = 0 → MIN_SEGMENT_TIME, time = 65535 → ~MAX_SEGMENT_TIME.
        let shortest = f64::from(u32::MAX) / f64::from(tables.increment(0));
        let longest = f64::from(u32::MAX) / f64::from(tables.increment(65535));
        let min_expected = f64::from(MIN_SEGMENT_TIME * sample_rate);
        let max_expected = f64::from(MAX_SEGMENT_TIME * sample_rate);

        assert!(
            (shortest - min_expected).abs() / min_expected < 0.02,
            "shortest duration {shortest} vs expected {min_expected}"
        );
        assert!(
            (longest - max_expected).abs() / max_expected < 0.02,
            "longest duration {longest} vs expected {max_expected}"
        );
    }

    #[test]
    fn test_increment_interpolates_between_steps() {
        let tables = EnvelopeTables::new(48000.0);
        let lo = tables.increment(0x1200);
        let hi = tables.increment(0x1300);
        let mid = tables.increment(0x1280);
        assert!(mid <= lo && mid >= hi, "mid {mid} outside [{hi}, {lo}]");
    }
}
