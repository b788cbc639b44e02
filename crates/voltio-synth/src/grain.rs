//! Granular playback engine.
//!
//! A [`Grain`] is one short playback event over a caller-owned sample
//! buffer: it reads the buffer at its own pitch ratio, shapes the result
//! with a synthesized amplitude window, and **adds** its contribution into
//! the output block. Many simultaneously active grains therefore sum —
//! the overlap-add principle — which is what [`GrainPool`] manages.
//!
//! Grains never own or write the sample buffer; they hold an offset into
//! it and treat it as a circular recording. The buffer's single writer is
//! elsewhere (the recorder path), so concurrent reading grains cannot race
//! it by construction.
//!
//! # Lifecycle
//!
//! `start` arms a grain; `overlap_add` advances it once per output sample;
//! the grain deactivates itself the instant its envelope completes,
//! freeing the slot for reuse. A `pre_delay` defers the first audible
//! sample within a block, so grains can begin at arbitrary sample
//! offsets, not only block boundaries.

/// One stereo output sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StereoFrame {
    /// Left channel.
    pub l: f32,
    /// Right channel.
    pub r: f32,
}

/// Sub-sample read quality, selectable per grain.
///
/// Cheap grains (dense clouds) truncate; sparse, exposed grains earn the
/// 4-point read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GrainQuality {
    /// Truncate to the nearest sample.
    Low,
    /// Linear interpolation between two samples.
    #[default]
    Medium,
    /// 4-point Hermite interpolation.
    High,
}

/// Parameters for arming one grain.
#[derive(Debug, Clone, Copy)]
pub struct GrainParams {
    /// Output samples to skip before the grain becomes audible.
    pub pre_delay: u32,
    /// Read offset into the sample buffer, in samples.
    pub start_offset: i32,
    /// Playback width in source samples.
    pub width: i32,
    /// Play the source range back to front.
    pub reverse: bool,
    /// Playback speed: 1.0 = unity pitch, 2.0 = octave up.
    pub pitch_ratio: f32,
    /// Window shape in [0, 1]: 0 = near-rectangular, 1 = triangular.
    pub window_shape: f32,
    /// Left output gain.
    pub gain_l: f32,
    /// Right output gain.
    pub gain_r: f32,
    /// Sub-sample read quality.
    pub quality: GrainQuality,
}

impl Default for GrainParams {
    fn default() -> Self {
        Self {
            pre_delay: 0,
            start_offset: 0,
            width: 2048,
            reverse: false,
            pitch_ratio: 1.0,
            window_shape: 1.0,
            gain_l: core::f32::consts::FRAC_1_SQRT_2,
            gain_r: core::f32::consts::FRAC_1_SQRT_2,
            quality: GrainQuality::Medium,
        }
    }
}

/// Slowest permitted playback: 1/128 of unity pitch.
const MIN_PITCH_RATIO: f32 = 1.0 / 128.0;
/// Steepest window slope (shape 0): the ramps occupy 1/64 of each half.
const MAX_WINDOW_SLOPE: f32 = 64.0;

/// A single granular playback event.
///
/// Source phase is 16.16 fixed point; the integer part indexes the sample
/// buffer relative to `start_offset`, wrapped circularly. The amplitude
/// window runs on its own normalized phase in [0, 2): a two-segment
/// piecewise-linear shape whose slope is derived from the window-shape
/// parameter through a quadratic response, covering everything from
/// near-rectangular to smoothly triangular.
#[derive(Debug, Clone)]
pub struct Grain {
    active: bool,
    pre_delay: u32,
    buffer_len: i32,
    first_sample: i32,
    phase: i64,
    phase_increment: i64,
    envelope_phase: f32,
    envelope_increment: f32,
    envelope_slope: f32,
    gain_l: f32,
    gain_r: f32,
    quality: GrainQuality,
}

impl Default for Grain {
    fn default() -> Self {
        Self::new()
    }
}

impl Grain {
    /// Create an inactive grain.
    pub fn new() -> Self {
        Self {
            active: false,
            pre_delay: 0,
            buffer_len: 1,
            first_sample: 0,
            phase: 0,
            phase_increment: 0,
            envelope_phase: 0.0,
            envelope_increment: 0.0,
            envelope_slope: 1.0,
            gain_l: 0.0,
            gain_r: 0.0,
            quality: GrainQuality::Medium,
        }
    }

    /// Arm the grain for playback over a buffer of `buffer_len` samples.
    ///
    /// Reverse grains start with their source phase at the far end and a
    /// negated increment, so playback still proceeds from the grain's
    /// logical start to its end while reading the source backwards.
    pub fn start(&mut self, params: &GrainParams, buffer_len: usize) {
        debug_assert!(buffer_len > 0);
        let width = params.width.max(1);
        let ratio = params.pitch_ratio.max(MIN_PITCH_RATIO);
        let increment = (ratio * 65536.0) as i64;

        let shape = params.window_shape.clamp(0.0, 1.0);
        let response = shape * shape;
        self.envelope_slope = 1.0 / response.max(1.0 / MAX_WINDOW_SLOPE);
        self.envelope_phase = 0.0;
        self.envelope_increment = 2.0 * ratio / width as f32;

        if params.reverse {
            self.phase = i64::from(width) << 16;
            self.phase_increment = -increment;
        } else {
            self.phase = 0;
            self.phase_increment = increment;
        }

        self.first_sample = params.start_offset;
        self.buffer_len = buffer_len as i32;
        self.pre_delay = params.pre_delay;
        self.gain_l = params.gain_l;
        self.gain_r = params.gain_r;
        self.quality = params.quality;
        self.active = true;
    }

    /// Whether the grain is currently playing (or waiting out a pre-delay).
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Force the grain inactive.
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Produce successive amplitude-window samples into `dest`.
    ///
    /// Writes a `-1.0` sentinel and stops early once the window phase
    /// passes its end — the signal for the caller (and [`Self::overlap_add`])
    /// to deactivate the grain. Returns the number of samples written,
    /// sentinel included.
    pub fn render_envelope(&mut self, dest: &mut [f32]) -> usize {
        for (i, slot) in dest.iter_mut().enumerate() {
            if self.envelope_phase >= 2.0 {
                *slot = -1.0;
                return i + 1;
            }
            let p = self.envelope_phase;
            let rising = p * self.envelope_slope;
            let falling = (2.0 - p) * self.envelope_slope;
            *slot = rising.min(falling).min(1.0);
            self.envelope_phase += self.envelope_increment;
        }
        dest.len()
    }

    /// Accumulate this grain's contribution into a stereo output block.
    ///
    /// No-op while inactive. `envelope_scratch` must be at least as long
    /// as `dest`; it is overwritten. The grain deactivates itself when its
    /// envelope completes mid-block.
    pub fn overlap_add(
        &mut self,
        samples: &[i16],
        dest: &mut [StereoFrame],
        envelope_scratch: &mut [f32],
    ) {
        if !self.active {
            return;
        }
        debug_assert!(envelope_scratch.len() >= dest.len());
        debug_assert_eq!(samples.len(), self.buffer_len as usize);

        let skip = (self.pre_delay as usize).min(dest.len());
        self.pre_delay -= skip as u32;
        if skip == dest.len() {
            return;
        }

        let out = &mut dest[skip..];
        let rendered = self.render_envelope(&mut envelope_scratch[..out.len()]);
        for (frame, &env) in out[..rendered].iter_mut().zip(envelope_scratch[..rendered].iter()) {
            if env < 0.0 {
                self.active = false;
                break;
            }
            let sample = self.read_interpolated(samples);
            frame.l += sample * env * self.gain_l;
            frame.r += sample * env * self.gain_r;
            self.phase += self.phase_increment;
        }
    }

    /// Read the source at the current phase with the configured quality.
    #[inline]
    fn read_interpolated(&self, samples: &[i16]) -> f32 {
        let len = self.buffer_len;
        let position = self.first_sample + (self.phase >> 16) as i32;
        let fractional = (self.phase & 0xffff) as f32 / 65536.0;
        let at = |offset: i32| -> f32 {
            let index = (position + offset).rem_euclid(len) as usize;
            f32::from(samples[index]) / 32768.0
        };
        match self.quality {
            GrainQuality::Low => at(0),
            GrainQuality::Medium => {
                let a = at(0);
                let b = at(1);
                a + (b - a) * fractional
            }
            GrainQuality::High => {
                let xm1 = at(-1);
                let x0 = at(0);
                let x1 = at(1);
                let x2 = at(2);
                let c = (x1 - xm1) * 0.5;
                let v = x0 - x1;
                let w = c + v;
                let a = w + v + (x2 - x0) * 0.5;
                let b = w + a;
                let f = fractional;
                (((a * f) - b) * f + c) * f + x0
            }
        }
    }
}

/// Fixed pool of grains summed into one output block.
///
/// # Example
///
/// ```rust
/// use voltio_synth::{GrainParams, GrainPool, StereoFrame};
///
/// let source = vec![0i16; 4096];
/// let mut pool: GrainPool<8> = GrainPool::new();
/// pool.start_grain(&GrainParams { width: 512, ..GrainParams::default() }, source.len());
///
/// let mut block = [StereoFrame::default(); 64];
/// let mut scratch = [0.0f32; 64];
/// pool.overlap_add(&source, &mut block, &mut scratch);
/// ```
#[derive(Debug, Clone)]
pub struct GrainPool<const N: usize> {
    grains: [Grain; N],
}

impl<const N: usize> Default for GrainPool<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> GrainPool<N> {
    /// Create a pool of inactive grains.
    pub fn new() -> Self {
        Self {
            grains: core::array::from_fn(|_| Grain::new()),
        }
    }

    /// Arm the first inactive grain; returns false when the pool is
    /// saturated and the event is dropped (deterministic exhaustion
    /// policy — no queueing, no stealing of audible grains).
    pub fn start_grain(&mut self, params: &GrainParams, buffer_len: usize) -> bool {
        if let Some(grain) = self.grains.iter_mut().find(|g| !g.is_active()) {
            grain.start(params, buffer_len);
            true
        } else {
            false
        }
    }

    /// Sum every active grain into `dest`.
    pub fn overlap_add(
        &mut self,
        samples: &[i16],
        dest: &mut [StereoFrame],
        envelope_scratch: &mut [f32],
    ) {
        for grain in &mut self.grains {
            grain.overlap_add(samples, dest, envelope_scratch);
        }
    }

    /// Number of currently active grains.
    pub fn active_count(&self) -> usize {
        self.grains.iter().filter(|g| g.is_active()).count()
    }

    /// Deactivate every grain.
    pub fn reset(&mut self) {
        for grain in &mut self.grains {
            grain.stop();
        }
    }
}
