//! Voltio Core - allocation-free DSP primitives for synthesizer modules
//!
//! This crate provides the foundational building blocks shared by the
//! voltio module emulations: interpolated lookup-table math, a
//! fixed-capacity circular buffer for audio-block hand-off, and the
//! saturating fixed-point helpers used on 16-bit signal paths. Everything
//! here is allocation-free after construction and safe to call from a
//! fixed-period audio callback.
//!
//! # Core Abstractions
//!
//! ## Lookup Tables
//!
//! Pure interpolation over caller-owned tables:
//!
//! - [`interpolate`] / [`interpolate_hermite`] / [`interpolate_wrap`] -
//!   float variants (linear, 4-point Hermite, cyclic)
//! - [`interpolate_q8`] / [`interpolate_q24`] / [`interpolate_u16_q24`] -
//!   fixed-point variants with 8 or 24 fractional index bits
//!
//! ## Buffering
//!
//! - [`RingBuffer`] - fixed-capacity ring with separate read/write cursors,
//!   non-blocking overwrite/immediate-read for the audio path and blocking
//!   write/read for everything else
//!
//! ## Saturating Math
//!
//! - [`clip16`] / [`clip_u16`] - branch-predictable saturation to the
//!   16-bit signal and control ranges
//! - [`flush_denormal`] - subnormal-float protection for decaying state
//!
//! # Design Principles
//!
//! - **Real-time safe**: no allocations, no blocking on the audio path
//! - **No dependencies on std**: pure `no_std` with `libm` for math
//! - **Preconditions over runtime checks**: hot-path index validity is the
//!   caller's contract, enforced with `debug_assert!` only
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! voltio-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod lut;
pub mod math;
pub mod ring;

// Re-export main items at crate root
pub use lut::{
    interpolate, interpolate_hermite, interpolate_q8, interpolate_q24, interpolate_u16_q24,
    interpolate_wrap,
};
pub use math::{clip16, clip_u16, flush_denormal};
pub use ring::RingBuffer;
