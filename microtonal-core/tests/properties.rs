//! Property-based tests for the conversion, quantization and scale-file code.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p microtonal-core --test properties
//! ```

use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use microtonal_core::catalog;
use microtonal_core::pitch::{freq_to_cents, freq_to_midi, midi_to_freq};
use microtonal_core::scala::ScalaNote;
use microtonal_core::{
    Direction, ExerciseOptions, IntervalExerciseGenerator, NoteName, Pitch, ScalaScale,
    Scale, ScaleCatalog, ScaleQuantizer, ScaleStep,
};

fn fifths() -> Scale {
    Scale::new(
        "fifths",
        vec![
            ScaleStep::new("C", 0.0),
            ScaleStep::new("G", 700.0),
            ScaleStep::new("C", 1200.0),
        ],
        vec![
            microtonal_core::Interval::new("fourth", 500.0),
            microtonal_core::Interval::new("fifth", 700.0),
            microtonal_core::Interval::new("octave", 1200.0),
        ],
    )
    .unwrap()
}

fn quantizer_scales() -> Vec<Scale> {
    let mut scales = catalog::builtin().scales.clone();
    scales.push(fifths());
    scales
}

// ============================================================================
// 1. Pitch Conversion
// ============================================================================

proptest! {
    #[test]
    fn midi_and_freq_are_inverse(m in 0.0f64..127.0, f in 1.0f64..20000.0) {
        let midi = freq_to_midi(midi_to_freq(m));
        prop_assert!((midi - m).abs() <= 1e-9 * m.abs().max(1.0));

        let freq = midi_to_freq(freq_to_midi(f));
        prop_assert!((freq - f).abs() <= 1e-9 * f);
    }

    #[test]
    fn spelled_pitch_round_trips(m in 0i32..=127, detune in -49.9f64..49.9) {
        let from_freq = Pitch::from_freq(midi_to_freq(f64::from(m) + detune / 100.0)).unwrap();
        let spelled = Pitch::from_note_name_and_cents(
            NoteName::from_midi_note(m),
            m.div_euclid(12) - 1,
            detune,
        );
        prop_assert_eq!(from_freq.note_name, spelled.note_name);
        prop_assert_eq!(from_freq.octave, spelled.octave);
        prop_assert!((from_freq.detune_cents - spelled.detune_cents).abs() < 1e-6);
    }
}

// ============================================================================
// 2. Quantization
// ============================================================================

proptest! {
    #[test]
    fn quantize_rounds_the_right_way(f in 20.0f64..15000.0, index in 0usize..5) {
        let scales = quantizer_scales();
        let scale = &scales[index % scales.len()];
        let quantizer = ScaleQuantizer::new(scale);
        let cents = freq_to_cents(f);

        let up = quantizer.quantize(f, Direction::Up).unwrap();
        prop_assert!(up.cents >= cents - 1e-6, "up {} < {}", up.cents, cents);
        prop_assert!(up.degree < scale.steps_per_equave());

        let down = quantizer.quantize(f, Direction::Down).unwrap();
        prop_assert!(down.cents <= cents + 1e-6, "down {} > {}", down.cents, cents);
        prop_assert!(down.cents <= up.cents + 1e-6);
    }

    #[test]
    fn available_notes_ascend_within_bounds(
        min in 20.0f64..2000.0,
        max in 20.0f64..5000.0,
        index in 0usize..5,
    ) {
        let scales = quantizer_scales();
        let scale = &scales[index % scales.len()];
        let notes = ScaleQuantizer::new(scale)
            .enumerate_available_notes(min, max)
            .unwrap();

        for pair in notes.windows(2) {
            prop_assert!(pair[0].cents <= pair[1].cents);
        }
        for note in &notes {
            prop_assert!(note.cents >= freq_to_cents(min) - 1e-6);
            prop_assert!(note.cents <= freq_to_cents(max) + 1e-6);
        }
    }
}

// ============================================================================
// 3. Exercise Generation
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn exercise_notes_stay_in_range(seed in any::<u64>(), larger in any::<bool>()) {
        let catalog = ScaleCatalog::new(vec![fifths()]);
        let options = ExerciseOptions {
            scale_name: "fifths".to_string(),
            include_larger_than_equave: larger,
            min_freq: 220.0,
            max_freq: 880.0,
            ..ExerciseOptions::default()
        };
        let mut generator =
            IntervalExerciseGenerator::configure(&catalog, &options, Pcg32::seed_from_u64(seed))
                .unwrap();

        for _ in 0..50 {
            let question = generator.next_interval().unwrap();
            for freq in question.freqs() {
                prop_assert!((220.0..=880.0).contains(&freq));
            }
        }
    }
}

// ============================================================================
// 4. Scale Files
// ============================================================================

fn note_token() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u32..100, 1u32..100).prop_map(|(a, b)| format!("{a}/{b}")),
        (0.0f64..2400.0).prop_map(|c| format!("{c:.5}")),
        (2u32..8).prop_map(|n| n.to_string()),
    ]
}

proptest! {
    #[test]
    fn scale_files_round_trip(
        name in "[a-z]{1,12}",
        description in "[a-z][a-z ]{0,20}",
        tokens in prop::collection::vec(note_token(), 1..16),
    ) {
        let notes: Vec<ScalaNote> = tokens.iter().filter_map(|t| ScalaNote::parse(t)).collect();
        prop_assert_eq!(notes.len(), tokens.len());
        let scale = ScalaScale { name, description, notes };

        let reparsed = ScalaScale::parse("fallback.scl", &scale.to_string()).unwrap();
        prop_assert_eq!(&reparsed.name, &scale.name);
        prop_assert_eq!(reparsed.notes.len(), scale.notes.len());
        for (a, b) in reparsed.notes.iter().zip(&scale.notes) {
            prop_assert!((a.cents - b.cents).abs() < 1e-6);
        }
    }
}
