//! Render a short granular texture and print level statistics.
//!
//! Records a plucked tone into a buffer (the "tape"), then scatters
//! pitched grains over it with a vactrol envelope shaping the overall
//! amplitude — a low-pass gate feeding a granular texture, offline.
//!
//! Run with: cargo run -p voltio-synth --example granular_texture

use voltio_synth::{
    EnvelopeTables, GrainParams, GrainPool, GrainQuality, MultistageEnvelope, StereoFrame,
    VactrolEnvelope,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK: usize = 64;
const SECONDS: f32 = 2.0;

fn main() {
    // 1. Record a decaying pluck into the tape buffer.
    let tables = EnvelopeTables::new(SAMPLE_RATE);
    let mut pluck_env = MultistageEnvelope::new();
    pluck_env.set_ad(4096, 40000);
    pluck_env.gate(true);

    let tape_len = SAMPLE_RATE as usize; // one second of source material
    let mut tape = vec![0i16; tape_len];
    let mut phase = 0.0f32;
    for sample in tape.iter_mut() {
        let env = f32::from(pluck_env.process(&tables)) / 65535.0;
        phase += 220.0 / SAMPLE_RATE;
        let tone = libm::sinf(phase * core::f32::consts::TAU);
        *sample = (tone * env * 28000.0) as i16;
    }

    // 2. Scatter grains over the tape, octaves and fifths up and down.
    let mut pool: GrainPool<24> = GrainPool::new();
    let mut lpg = VactrolEnvelope::new();
    lpg.set_short_decay(0.0005);
    lpg.set_decay_tail(0.002);

    let total_blocks = (SECONDS * SAMPLE_RATE) as usize / BLOCK;
    let pitches = [0.5f32, 1.0, 1.5, 2.0];
    let mut out = vec![StereoFrame::default(); total_blocks * BLOCK];
    let mut scratch = [0.0f32; BLOCK];
    let mut seed = 0x2545_F491u32;

    for block_index in 0..total_blocks {
        // A cheap LCG stands in for the module's noise source.
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        if seed % 4 == 0 {
            let pitch = pitches[(seed >> 8) as usize % pitches.len()];
            let pan = (seed >> 16 & 0xff) as f32 / 255.0;
            pool.start_grain(
                &GrainParams {
                    pre_delay: (seed >> 24) % BLOCK as u32,
                    start_offset: (seed % tape_len as u32) as i32,
                    width: 2400,
                    pitch_ratio: pitch,
                    window_shape: 0.8,
                    gain_l: 0.4 * (1.0 - pan),
                    gain_r: 0.4 * pan,
                    quality: GrainQuality::High,
                    ..GrainParams::default()
                },
                tape.len(),
            );
        }

        // Ping the gate on downbeats, let the vactrol ring out.
        let gate = if block_index % 180 < 8 { 1.0 } else { 0.0 };

        let block = &mut out[block_index * BLOCK..(block_index + 1) * BLOCK];
        pool.overlap_add(&tape, block, &mut scratch);
        for frame in block.iter_mut() {
            let gain = lpg.process(gate, 0.1);
            frame.l *= gain;
            frame.r *= gain;
        }
    }

    // 3. Report.
    let peak = out
        .iter()
        .map(|f| f.l.abs().max(f.r.abs()))
        .fold(0.0f32, f32::max);
    let rms = libm::sqrtf(
        out.iter().map(|f| (f.l * f.l + f.r * f.r) * 0.5).sum::<f32>() / out.len() as f32,
    );
    println!("rendered {:.1}s of granular texture", SECONDS);
    println!("  grains in flight at end: {}", pool.active_count());
    println!("  peak: {peak:.3}  rms: {rms:.3}");
}
