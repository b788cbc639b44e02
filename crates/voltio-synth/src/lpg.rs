//! Vactrol-style low-pass-gate envelope.
//!
//! Models the photoresistor element of a low-pass gate: a single scalar
//! state low-pass filtered toward the gate signal with an asymmetric
//! coefficient — a fast, fixed-rate attack and a slow decay whose rate
//! depends on the current level through a quartic term. The same state
//! drives three outputs at once: amplitude gain, a cutoff-frequency
//! modulation for the companion filter, and a high-frequency bleed amount
//! that grows as the gate closes.
//!
//! The quartic (`s⁴`) nonlinearity is the characteristic vactrol response
//! curve. It is part of the timbral contract of this module — do not
//! replace it with a linear slope.

use voltio_core::flush_denormal;

/// Fixed one-pole coefficient used whenever the target exceeds the state.
pub const VACTROL_ATTACK_COEFF: f32 = 0.6;

/// Low-pass-gate envelope with vactrol dynamics.
///
/// # Outputs
///
/// After each [`VactrolEnvelope::process`] step:
///
/// - [`gain`](VactrolEnvelope::gain) — amplitude, equal to the state `s`
/// - [`cutoff`](VactrolEnvelope::cutoff) — normalized filter frequency,
///   `base + env_amount * s⁴ + hf_amount * hf`
/// - [`hf_bleed`](VactrolEnvelope::hf_bleed) — high-frequency leakage,
///   approaching the HF input as `s → 0`
///
/// # Invariants
///
/// - `s` stays in [0, 1] for any sequence of gate values in [0, 1]
/// - the decay coefficient stays in (0, 1], enforced by the setters
#[derive(Debug, Clone)]
pub struct VactrolEnvelope {
    state: f32,
    short_decay: f32,
    decay_tail: f32,
    cutoff_base: f32,
    cutoff_env_amount: f32,
    cutoff_hf_amount: f32,
    gain: f32,
    cutoff: f32,
    hf_bleed: f32,
}

impl Default for VactrolEnvelope {
    fn default() -> Self {
        Self::new()
    }
}

impl VactrolEnvelope {
    /// Create a closed gate with a medium decay.
    pub fn new() -> Self {
        Self {
            state: 0.0,
            short_decay: 0.02,
            decay_tail: 0.05,
            cutoff_base: 0.003,
            cutoff_env_amount: 0.3,
            cutoff_hf_amount: 0.04,
            gain: 0.0,
            cutoff: 0.003,
            hf_bleed: 0.0,
        }
    }

    /// Set the base decay coefficient (the rate near full level).
    ///
    /// Clamped to [1e-4, 0.5]; the tail amount is re-clamped so the total
    /// coefficient never exceeds 1.
    pub fn set_short_decay(&mut self, coeff: f32) {
        self.short_decay = coeff.clamp(1e-4, 0.5);
        self.decay_tail = self.decay_tail.min(1.0 - self.short_decay);
    }

    /// Set the level-dependent decay amount, scaled by `1 - s⁴`.
    ///
    /// Clamped to keep `short_decay + decay_tail` at most 1.
    pub fn set_decay_tail(&mut self, amount: f32) {
        self.decay_tail = amount.clamp(0.0, 1.0 - self.short_decay);
    }

    /// Set the cutoff response: `cutoff = base + env * s⁴ + hf * hf_input`,
    /// all in normalized frequency (cycles per sample).
    pub fn set_cutoff_response(&mut self, base: f32, env_amount: f32, hf_amount: f32) {
        self.cutoff_base = base;
        self.cutoff_env_amount = env_amount;
        self.cutoff_hf_amount = hf_amount;
    }

    /// Advance one step toward `gate` and refresh the derived outputs.
    ///
    /// `gate` is the excitation level in [0, 1] (a boolean gate maps to
    /// 0.0/1.0, a ping to a decaying excitation); `hf` is the
    /// high-frequency energy estimate of the input in [0, 1]. Returns the
    /// gain.
    #[inline]
    pub fn process(&mut self, gate: f32, hf: f32) -> f32 {
        let target = gate.clamp(0.0, 1.0);
        let error = target - self.state;
        let s2 = self.state * self.state;
        let s4 = s2 * s2;
        let coefficient = if error > 0.0 {
            VACTROL_ATTACK_COEFF
        } else {
            self.short_decay + self.decay_tail * (1.0 - s4)
        };
        self.state = flush_denormal((self.state + error * coefficient).clamp(0.0, 1.0));

        let s2 = self.state * self.state;
        let s4 = s2 * s2;
        self.gain = self.state;
        self.cutoff = self.cutoff_base + self.cutoff_env_amount * s4 + self.cutoff_hf_amount * hf;
        self.hf_bleed = hf * (1.0 - self.state);
        self.gain
    }

    /// Current vactrol state (same value as [`Self::gain`]).
    pub fn state(&self) -> f32 {
        self.state
    }

    /// Amplitude gain in [0, 1].
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Normalized cutoff frequency for the companion filter.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// High-frequency bleed amount.
    pub fn hf_bleed(&self) -> f32 {
        self.hf_bleed
    }

    /// Snap the gate fully closed.
    pub fn reset(&mut self) {
        self.state = 0.0;
        self.gain = 0.0;
        self.cutoff = self.cutoff_base;
        self.hf_bleed = 0.0;
    }
}
