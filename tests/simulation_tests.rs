use mcforecast::data::dataset::Dataset;
use mcforecast::simulation::{
    CongruentialGenerator, DrawBounds, EngineConfig, ErrorKind, FrequencyTable, GeneratorConfig,
    HistoricalRecord, IntervalTable, SimulationEngine, SimulationError, DEFAULT_SCALE,
    PROBABILITY_EPSILON,
};
use proptest::prelude::*;

fn approx_eq(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "expected {b}, got {a}");
}

fn sample_engine() -> SimulationEngine {
    SimulationEngine::new(&Dataset::sample().records, EngineConfig::default())
        .expect("sample dataset should build")
}

#[test]
fn sample_frequency_table_matches_registrant_series() {
    let engine = sample_engine();
    let table = engine.frequencies();

    assert_eq!(table.total(), 30_104);
    let first = table.entries()[0];
    assert_eq!(first.category, 2015);
    approx_eq(first.probability, 1383.0 / 30_104.0, 1e-12);
    approx_eq(first.probability, 0.04594, 1e-5);
    assert_eq!(table.entries()[9].cumulative, 1.0);
}

#[test]
fn sample_intervals_are_rounded_and_chained() {
    let engine = sample_engine();
    let bounds: Vec<String> = engine
        .intervals()
        .slots()
        .iter()
        .map(|slot| slot.interval.expect("every sample year owns digits").to_string())
        .collect();

    assert_eq!(
        bounds,
        vec![
            "0-45", "46-121", "122-209", "210-299", "300-389", "390-485", "486-598", "599-720",
            "721-844", "845-999",
        ]
    );
}

#[test]
fn three_draw_scenario_matches_hand_computation() {
    let run = sample_engine().run(3).expect("three draws");

    let first = run.steps[0];
    assert_eq!(first.index, 1);
    assert_eq!(first.seed_in, 50);
    assert_eq!(first.raw, 25 * 50 + 15);
    assert_eq!(first.modded, 1265 % 99);
    assert_eq!(first.scaled_digit, 777);
    // 777 falls in 721-844.
    assert_eq!(first.predicted_category, 2023);
    assert_eq!(first.predicted_count, 3715);

    let summary: Vec<(u64, u64, u64, u32, i32)> = run
        .steps
        .iter()
        .map(|s| (s.seed_in, s.raw, s.modded, s.scaled_digit, s.predicted_category))
        .collect();
    assert_eq!(
        summary,
        vec![
            (50, 1265, 77, 777, 2023),
            (77, 1940, 59, 595, 2021),
            (59, 1490, 5, 50, 2016),
        ]
    );
    assert_eq!(run.prediction.category, 2016);
    assert_eq!(run.prediction.count, 2293);
}

#[test]
fn generator_reproduces_fixed_five_step_sequence() {
    let config = GeneratorConfig {
        multiplier: 25,
        increment: 15,
        modulus: 99,
        seed: 50,
    };
    for _ in 0..3 {
        let mut rng = CongruentialGenerator::new(config).expect("valid generator");
        let pairs: Vec<(u64, u64)> = (0..5).map(|_| rng.next()).map(|d| (d.raw, d.modded)).collect();
        assert_eq!(
            pairs,
            vec![(1265, 77), (1940, 59), (1490, 5), (140, 41), (1040, 50)]
        );
    }
}

#[test]
fn repeated_runs_are_identical() {
    let engine = sample_engine();
    let a = engine.run(20).expect("first run");
    let b = engine.run(20).expect("second run");
    assert_eq!(a, b);

    let rebuilt = sample_engine().run(20).expect("fresh engine");
    assert_eq!(a, rebuilt);
}

#[test]
fn steps_chain_seed_to_previous_residue() {
    let run = sample_engine().run(20).expect("twenty draws");
    for pair in run.steps.windows(2) {
        assert_eq!(pair[1].seed_in, pair[0].modded);
        assert_eq!(pair[1].index, pair[0].index + 1);
    }
}

#[test]
fn draw_count_bounds_are_enforced() {
    let engine = sample_engine();

    let one = engine.run(1).expect("lower bound");
    assert_eq!(one.steps.len(), 1);
    assert_eq!(one.prediction.category, one.steps[0].predicted_category);

    let twenty = engine.run(20).expect("upper bound");
    assert_eq!(twenty.steps.len(), 20);

    for bad in [0, 21, 1000] {
        let err = engine.run(bad).expect_err("out of range");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            err,
            SimulationError::DrawCountOutOfRange {
                requested: bad,
                min: 1,
                max: 20
            }
        );
    }
}

#[test]
fn custom_bounds_widen_accepted_draws() {
    let config = EngineConfig {
        draws: DrawBounds { min: 1, max: 50 },
        ..EngineConfig::default()
    };
    let engine = SimulationEngine::new(&Dataset::sample().records, config).expect("engine");
    assert_eq!(engine.run(50).map(|run| run.steps.len()), Ok(50));
}

#[test]
fn all_zero_dataset_is_rejected_without_nan() {
    let records = [HistoricalRecord::new(2020, 0), HistoricalRecord::new(2021, 0)];
    let err = SimulationEngine::new(&records, EngineConfig::default()).expect_err("zero total");
    assert_eq!(err, SimulationError::ZeroTotal);
    assert!(err.is_invalid_input());

    assert_eq!(
        SimulationEngine::new(&[], EngineConfig::default()).map(|_| ()),
        Err(SimulationError::EmptyDataset)
    );
}

#[test]
fn invalid_generator_is_rejected_before_running() {
    let config = EngineConfig {
        generator: GeneratorConfig {
            seed: 120,
            ..GeneratorConfig::default()
        },
        ..EngineConfig::default()
    };
    let err = SimulationEngine::new(&Dataset::sample().records, config).expect_err("bad seed");
    assert!(matches!(err, SimulationError::InvalidGenerator(_)));
}

#[test]
fn interval_miss_is_an_internal_error() {
    let err = sample_engine()
        .intervals()
        .lookup(DEFAULT_SCALE)
        .expect_err("digit beyond scale");
    assert_eq!(err.kind(), ErrorKind::Internal);
}

proptest! {
    #[test]
    fn probabilities_sum_to_one(counts in prop::collection::vec(0u64..50_000, 1..40)) {
        prop_assume!(counts.iter().any(|&c| c > 0));
        let records: Vec<HistoricalRecord> = counts
            .iter()
            .enumerate()
            .map(|(i, &count)| HistoricalRecord::new(2000 + i as i32, count))
            .collect();
        let table = FrequencyTable::build(&records).expect("non-zero total");

        let sum: f64 = table.entries().iter().map(|e| e.probability).sum();
        prop_assert!((sum - 1.0).abs() <= PROBABILITY_EPSILON);
        for pair in table.entries().windows(2) {
            prop_assert!(pair[1].cumulative >= pair[0].cumulative);
            if pair[1].probability > 0.0 {
                prop_assert!(pair[1].cumulative > pair[0].cumulative);
            }
        }
        let last = table.entries().last().expect("non-empty");
        prop_assert!((last.cumulative - 1.0).abs() <= PROBABILITY_EPSILON);
    }

    #[test]
    fn intervals_partition_the_scale(counts in prop::collection::vec(0u64..50_000, 1..40)) {
        prop_assume!(counts.iter().any(|&c| c > 0));
        let records: Vec<HistoricalRecord> = counts
            .iter()
            .enumerate()
            .map(|(i, &count)| HistoricalRecord::new(i as i32, count))
            .collect();
        let frequencies = FrequencyTable::build(&records).expect("non-zero total");
        let table = IntervalTable::assign(&frequencies, DEFAULT_SCALE).expect("valid scale");

        let occupied: Vec<_> = table.slots().iter().filter_map(|slot| slot.interval).collect();
        prop_assert_eq!(occupied.first().map(|i| i.lower_bound), Some(0));
        prop_assert_eq!(occupied.last().map(|i| i.upper_bound), Some(DEFAULT_SCALE - 1));
        for pair in occupied.windows(2) {
            prop_assert_eq!(pair[1].lower_bound, pair[0].upper_bound + 1);
        }

        for digit in 0..DEFAULT_SCALE {
            let containing = table
                .slots()
                .iter()
                .filter(|slot| slot.interval.is_some_and(|i| i.contains(digit)))
                .count();
            prop_assert_eq!(containing, 1);
            prop_assert!(table.lookup(digit).is_ok());
        }
    }

    #[test]
    fn any_valid_generator_yields_digits_in_scale(
        multiplier in 1u64..10_000,
        increment in 1u64..10_000,
        modulus in 1u64..10_000,
        seed_fraction in 0.0f64..1.0,
    ) {
        let seed = ((modulus as f64) * seed_fraction) as u64 % modulus;
        let config = GeneratorConfig { multiplier, increment, modulus, seed };
        let mut rng = CongruentialGenerator::new(config).expect("valid generator");
        let mut previous = seed;
        for _ in 0..20 {
            let draw = rng.next();
            prop_assert_eq!(draw.seed_in, previous);
            prop_assert!(draw.modded < modulus);
            prop_assert!(rng.scale_to_digit(draw.modded, DEFAULT_SCALE) < DEFAULT_SCALE);
            previous = draw.modded;
        }
    }
}
