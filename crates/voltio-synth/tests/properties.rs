//! Property-based tests for the voltio-synth machines.
//!
//! Uses proptest to verify structural invariants under randomized input:
//! note-stack bookkeeping, vactrol state containment, allocator identity
//! rules, and predictor stability.

use proptest::prelude::*;
use std::collections::HashSet;
use voltio_synth::{
    EnvelopeTables, MultistageEnvelope, NOT_ALLOCATED, NoteStack, PatternPredictor,
    VactrolEnvelope, VoiceAllocator,
};

/// A randomized key event: press (with velocity) or release.
#[derive(Debug, Clone, Copy)]
enum KeyEvent {
    On(u8, u8),
    Off(u8),
}

fn key_events(max_len: usize) -> impl Strategy<Value = Vec<KeyEvent>> {
    prop::collection::vec(
        prop_oneof![
            (1u8..=96, 1u8..=127).prop_map(|(n, v)| KeyEvent::On(n, v)),
            (1u8..=96).prop_map(KeyEvent::Off),
        ],
        0..=max_len,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// For any sequence of presses and releases, size() equals the number
    /// of currently-held notes (capped by eviction) and sorted_note(i) is
    /// non-decreasing in i.
    #[test]
    fn note_stack_size_and_order(events in key_events(64)) {
        let mut stack: NoteStack<6> = NoteStack::new();
        let mut held: Vec<u8> = Vec::new(); // model: press order, newest last

        for event in events {
            match event {
                KeyEvent::On(note, velocity) => {
                    stack.note_on(note, velocity);
                    held.retain(|&n| n != note);
                    if held.len() == 6 {
                        held.remove(0); // least recently played
                    }
                    held.push(note);
                }
                KeyEvent::Off(note) => {
                    let was_held = held.contains(&note);
                    prop_assert_eq!(stack.note_off(note), was_held);
                    held.retain(|&n| n != note);
                }
            }

            prop_assert_eq!(stack.size(), held.len());

            // Pitch order is non-decreasing and a permutation of the model.
            let mut sorted_model: Vec<u8> = held.clone();
            sorted_model.sort_unstable();
            let sorted_stack: Vec<u8> =
                (0..stack.size()).map(|i| stack.sorted_note(i).note).collect();
            prop_assert_eq!(&sorted_stack, &sorted_model);

            // Press order agrees with the model at both ends.
            if let Some(&newest) = held.last() {
                prop_assert_eq!(stack.most_recent_note().note, newest);
            }
            if let Some(&oldest) = held.first() {
                prop_assert_eq!(stack.least_recent_note().note, oldest);
            }
        }
    }

    /// The vactrol state stays in [0, 1] and converges monotonically for a
    /// step input, for any decay configuration.
    #[test]
    fn vactrol_contained_and_monotone(
        short_decay in 1e-4f32..0.5,
        decay_tail in 0.0f32..1.0,
        gates in prop::collection::vec(0.0f32..=1.0, 1..=128),
    ) {
        let mut lpg = VactrolEnvelope::new();
        lpg.set_short_decay(short_decay);
        lpg.set_decay_tail(decay_tail);

        // Arbitrary gate sequence: containment.
        for &gate in &gates {
            lpg.process(gate, 0.3);
            prop_assert!((0.0..=1.0).contains(&lpg.state()),
                "state {} escaped [0,1]", lpg.state());
        }

        // Step input: strict monotone convergence until saturation.
        lpg.reset();
        let mut last = 0.0f32;
        for _ in 0..64 {
            let s = lpg.process(1.0, 0.0);
            prop_assert!(s >= last, "non-monotone step response: {} < {}", s, last);
            last = s;
        }
        prop_assert!(last > 0.99);
    }

    /// Re-issuing note_on for an already-sounding note always returns the
    /// same voice, and distinct sounding notes never share a voice.
    #[test]
    fn allocator_identity_rules(notes in prop::collection::vec(1u8..=24, 1..=64)) {
        let mut allocator: VoiceAllocator<5> = VoiceAllocator::new();
        for &note in &notes {
            let voice = allocator.note_on(note);
            prop_assert!(voice != NOT_ALLOCATED && voice < 5);
            // Idempotence.
            prop_assert_eq!(allocator.note_on(note), voice);

            // No two sounding voices hold the same note, and every voice
            // index appears at most once among sounding notes.
            let mut seen = HashSet::new();
            for v in 0..5 {
                if allocator.active(v) {
                    prop_assert!(seen.insert(allocator.note(v)),
                        "note {} sounded by two voices", allocator.note(v));
                }
            }
        }
    }

    /// A constant interval stream always predicts that constant once the
    /// history has filled.
    #[test]
    fn predictor_constant_lock(interval in 1u32..1_000_000) {
        let mut predictor: PatternPredictor<16, 8> = PatternPredictor::new();
        let mut prediction = 0;
        for _ in 0..40 {
            prediction = predictor.predict(interval);
        }
        // Lag-0 average converges within rounding of the constant.
        prop_assert!(
            prediction.abs_diff(interval) <= 1 + interval / 1000,
            "constant stream mispredicted: {} vs {}", prediction, interval
        );
    }

    /// Whatever the segment times and trigger position, the AD envelope
    /// never decreases during its attack segment and `value()` always
    /// reports the last processed output.
    #[test]
    fn envelope_attack_monotone_for_any_times(
        attack in 0u16..=65535,
        decay in 0u16..=65535,
        gate_at in 0usize..64,
    ) {
        let tables = EnvelopeTables::new(48000.0);
        let mut env = MultistageEnvelope::new();
        env.set_ad(attack, decay);
        let mut last = 0u16;
        let mut in_attack = false;
        for i in 0..4096usize {
            if i == gate_at {
                env.gate(true);
                in_attack = true;
                last = 0;
            }
            let was_done = env.is_done();
            let v = env.process(&tables);
            prop_assert_eq!(v, env.value());
            if in_attack && !was_done {
                if v < last {
                    // Attack ended (decay is under way); stop checking.
                    in_attack = false;
                } else {
                    last = v;
                }
            }
        }
    }
}
