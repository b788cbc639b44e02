//! Clock pattern predictor.
//!
//! Consumes a stream of integer intervals (time between clock edges) and
//! guesses the next one by matching against recent history at a range of
//! lags. For each candidate lag the predictor keeps a smoothed absolute
//! error between what that lag would have predicted and what actually
//! arrived; the lag with the lowest error wins. Lag zero is a running
//! average, which covers steady clocks; larger lags lock onto swing and
//! other repeating interval patterns.
//!
//! This is a greedy nearest-history matcher, not an autocorrelation: it
//! converges within a couple of pattern lengths and never blocks waiting
//! for a full period.
//!
//! # Tie-breaking
//!
//! Candidates are scored in ascending lag order and an incumbent is only
//! replaced on strictly lower error, so the smallest lag wins ties. This
//! is deliberate and musically load-bearing: a longer lag with equal error
//! would lock onto a harmonic of the pattern and shift every swung beat.

/// Error smoothing when the error is growing (fast adaptation).
const ERROR_RISE_COEFF: f32 = 0.5;
/// Error smoothing when the error is shrinking (slow forgiveness).
const ERROR_FALL_COEFF: f32 = 0.1;
/// Smoothing for the lag-zero running average.
const AVERAGE_COEFF: f32 = 0.25;

/// Online next-interval predictor over a rolling history.
///
/// `HISTORY` is the length of the interval history ring, `MAX_LAG` the
/// largest candidate pattern length; `HISTORY` must exceed `MAX_LAG`.
///
/// # Example
///
/// ```rust
/// use voltio_synth::PatternPredictor;
///
/// let mut predictor: PatternPredictor<16, 8> = PatternPredictor::new();
/// // A swung clock: long-short, long-short...
/// let mut expected = 0;
/// for i in 0..32 {
///     let interval = if i % 2 == 0 { 600 } else { 400 };
///     expected = predictor.predict(interval);
/// }
/// assert_eq!(expected, 600); // next interval after a 400 is a 600
/// ```
#[derive(Debug, Clone)]
pub struct PatternPredictor<const HISTORY: usize, const MAX_LAG: usize> {
    history: [u32; HISTORY],
    write: usize,
    average: f32,
    average_error: f32,
    lag_error: [f32; MAX_LAG],
    prediction: u32,
}

impl<const HISTORY: usize, const MAX_LAG: usize> Default for PatternPredictor<HISTORY, MAX_LAG> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const HISTORY: usize, const MAX_LAG: usize> PatternPredictor<HISTORY, MAX_LAG> {
    /// Create an empty predictor.
    ///
    /// # Panics
    ///
    /// Panics unless `1 <= MAX_LAG < HISTORY`.
    pub fn new() -> Self {
        assert!(MAX_LAG >= 1 && MAX_LAG < HISTORY);
        Self {
            history: [0; HISTORY],
            write: 0,
            average: 0.0,
            average_error: 0.0,
            lag_error: [0.0; MAX_LAG],
            prediction: 0,
        }
    }

    /// Record an observed interval and return the predicted next one.
    pub fn predict(&mut self, interval: u32) -> u32 {
        let observed = interval as f32;

        // Score every candidate against the value that just arrived,
        // before the history is updated.
        smooth(&mut self.average_error, (observed - self.average).abs());
        for lag in 1..=MAX_LAG {
            let candidate = self.history[(self.write + HISTORY - lag) % HISTORY] as f32;
            smooth(&mut self.lag_error[lag - 1], (observed - candidate).abs());
        }

        self.history[self.write] = interval;
        self.write = (self.write + 1) % HISTORY;
        self.average += (observed - self.average) * AVERAGE_COEFF;

        // Ascending scan with strict comparison: the smallest lag keeps
        // ties (see module docs).
        let mut best_error = self.average_error;
        let mut best_lag = 0;
        for lag in 1..=MAX_LAG {
            if self.lag_error[lag - 1] < best_error {
                best_error = self.lag_error[lag - 1];
                best_lag = lag;
            }
        }

        self.prediction = if best_lag == 0 {
            self.average as u32
        } else {
            self.history[(self.write + HISTORY - best_lag) % HISTORY]
        };
        self.prediction
    }

    /// The most recent prediction, without recording anything.
    pub fn prediction(&self) -> u32 {
        self.prediction
    }

    /// Clear all history and error state.
    pub fn reset(&mut self) {
        self.history = [0; HISTORY];
        self.write = 0;
        self.average = 0.0;
        self.average_error = 0.0;
        self.lag_error = [0.0; MAX_LAG];
        self.prediction = 0;
    }
}

/// One-pole error smoothing with asymmetric coefficients: errors grow
/// quickly and are forgiven slowly, so one lucky match cannot win a lag
/// the pattern has abandoned.
#[inline]
fn smooth(error: &mut f32, observed: f32) {
    let delta = observed - *error;
    let coeff = if delta > 0.0 {
        ERROR_RISE_COEFF
    } else {
        ERROR_FALL_COEFF
    };
    *error += delta * coeff;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_stream_predicts_constant() {
        let mut predictor: PatternPredictor<16, 8> = PatternPredictor::new();
        let mut prediction = 0;
        for _ in 0..32 {
            prediction = predictor.predict(500);
        }
        assert_eq!(prediction, 500);
    }

    #[test]
    fn test_period_two_pattern_locks() {
        let mut predictor: PatternPredictor<16, 8> = PatternPredictor::new();
        // Swing pattern with period 2; feed 2 * MAX_LAG = 16 warmup values.
        let pattern = [600u32, 400];
        for i in 0..16 {
            predictor.predict(pattern[i % 2]);
        }
        // From here on every prediction must be exact.
        for i in 16..48 {
            let prediction = predictor.prediction();
            let actual = pattern[i % 2];
            assert_eq!(prediction, actual, "missed at step {i}");
            predictor.predict(actual);
        }
    }

    #[test]
    fn test_period_three_pattern_locks() {
        let mut predictor: PatternPredictor<16, 8> = PatternPredictor::new();
        let pattern = [300u32, 300, 600];
        for i in 0..18 {
            predictor.predict(pattern[i % 3]);
        }
        for i in 18..60 {
            let prediction = predictor.prediction();
            let actual = pattern[i % 3];
            assert_eq!(prediction, actual, "missed at step {i}");
            predictor.predict(actual);
        }
    }

    #[test]
    fn test_smallest_lag_wins_ties() {
        let mut predictor: PatternPredictor<16, 8> = PatternPredictor::new();
        // A constant stream gives identical (zero) error at every lag;
        // the tie must resolve to lag 0, the running average, so a tempo
        // drift is tracked immediately rather than echoed at some longer
        // lag.
        for _ in 0..32 {
            predictor.predict(480);
        }
        // Drift the tempo; the average follows at 0.25 per step.
        predictor.predict(520);
        let p = predictor.prediction();
        assert!(
            p > 480 && p <= 520,
            "lag-0 average should track the drift, got {p}"
        );
    }

    #[test]
    fn test_recovers_after_pattern_change() {
        let mut predictor: PatternPredictor<16, 8> = PatternPredictor::new();
        let first = [600u32, 400];
        for i in 0..32 {
            predictor.predict(first[i % 2]);
        }
        // Switch to a new period-2 pattern; within a few pattern lengths
        // the predictor must lock again.
        let second = [250u32, 750];
        for i in 0..16 {
            predictor.predict(second[i % 2]);
        }
        for i in 16..40 {
            let prediction = predictor.prediction();
            let actual = second[i % 2];
            assert_eq!(prediction, actual, "missed after change at step {i}");
            predictor.predict(actual);
        }
    }

    #[test]
    fn test_reset_clears_lock() {
        let mut predictor: PatternPredictor<16, 4> = PatternPredictor::new();
        for _ in 0..16 {
            predictor.predict(999);
        }
        predictor.reset();
        assert_eq!(predictor.prediction(), 0);
    }

    #[test]
    #[should_panic]
    fn test_lag_must_fit_history() {
        let _bad: PatternPredictor<4, 4> = PatternPredictor::new();
    }
}
