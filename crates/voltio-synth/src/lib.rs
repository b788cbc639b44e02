//! Voltio Synth - real-time synthesis machines for the voltio DSP core
//!
//! This crate provides the stateful block-processing engines shared by the
//! voltio module emulations: segment and low-pass-gate envelopes, a
//! granular playback engine, a clock pattern predictor, and the note
//! stack / voice allocator pair used for key assignment. Everything runs
//! inside a fixed-period audio or control callback: no allocation after
//! construction, no blocking, bounded work per call.
//!
//! # Core Components
//!
//! ## Envelopes
//!
//! - [`MultistageEnvelope`] - up to eight segments with per-segment shape,
//!   time and level, optional sustain point and loop range; fixed-point
//!   phase with carry-detected segment completion
//! - [`EnvelopeTables`] - the shape/duration lookup bank the envelope
//!   reads, built once per sample rate and passed by reference
//! - [`VactrolEnvelope`] - low-pass-gate dynamics: fast attack, slow
//!   level-dependent decay, with coupled gain / cutoff / HF-bleed outputs
//!
//! ```rust
//! use voltio_synth::{EnvelopeTables, MultistageEnvelope};
//!
//! let tables = EnvelopeTables::new(48000.0);
//! let mut env = MultistageEnvelope::new();
//! env.set_ad(8192, 24576);
//! env.gate(true);
//! let mut block = [0u16; 24];
//! env.render(&tables, &mut block);
//! ```
//!
//! ## Granular Playback
//!
//! - [`Grain`] - one windowed playback event over a shared sample buffer
//! - [`GrainPool`] - fixed pool summing all active grains (overlap-add)
//! - [`GrainParams`] / [`GrainQuality`] - per-grain configuration
//!
//! ## Clock Prediction
//!
//! - [`PatternPredictor`] - guesses the next clock interval by matching
//!   recent history at a range of lags; locks onto swing within a couple
//!   of pattern lengths
//!
//! ## Key Assignment
//!
//! - [`NoteStack`] - held keys in press order and pitch order at once,
//!   with monophonic priority queries
//! - [`VoiceAllocator`] - fixed voice pool with least-recently-used
//!   stealing and same-note reuse
//!
//! ## Persisted State
//!
//! - [`CalibrationSettings`] / [`EnvelopeSettings`] / [`VoicingSettings`] -
//!   plain structs read at construction; enable the `serde` feature for
//!   `Serialize`/`Deserialize` derives
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! voltio-synth = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod envelope;
pub mod grain;
pub mod lpg;
pub mod note_stack;
pub mod predictor;
pub mod settings;
pub mod tables;
pub mod voice_allocator;

// Re-export main types at crate root
pub use envelope::{EnvelopeShape, MAX_SEGMENTS, MultistageEnvelope};
pub use grain::{Grain, GrainParams, GrainPool, GrainQuality, StereoFrame};
pub use lpg::{VACTROL_ATTACK_COEFF, VactrolEnvelope};
pub use note_stack::{NoteEntry, NotePriority, NoteStack};
pub use predictor::PatternPredictor;
pub use settings::{CalibrationSettings, EnvelopeSettings, VoicingSettings};
pub use tables::{EnvelopeTables, TABLE_LEN};
pub use voice_allocator::{NOT_ALLOCATED, VoiceAllocator};

// Re-export commonly used primitives from voltio-core
pub use voltio_core::{RingBuffer, clip16, clip_u16};
