//! End-to-end tests for the nested case-control sampler

use ncc_sampler::algorithm::population::{SyntheticCohortConfig, generate_cohort};
use ncc_sampler::{InMemoryCohort, NestedCaseControlSampler, ResultRow, SamplingConfig};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::utils::{FEMALE, assert_well_formed, case, permissive_config, person, sample, strata};

fn synthetic_cohort(persons: usize, seed: u64) -> Vec<ncc_sampler::NestingCohortRecord> {
    let config = SyntheticCohortConfig {
        persons,
        outcome_rate: 0.2,
        ..SyntheticCohortConfig::default()
    };
    generate_cohort(&config, &mut StdRng::seed_from_u64(seed))
}

#[test]
fn test_single_case_single_control() {
    let config = permissive_config().controls_per_case(1).build();
    let records = vec![case(1, 0, &[500]), person(2, 0)];

    let table = sample(config, records, 1);

    assert_eq!(
        table.rows(),
        &[ResultRow::case(1, 500, 1), ResultRow::control(2, 500, 1)]
    );
}

#[test]
fn test_no_candidate_within_age_caliper_emits_case_only() {
    let config = permissive_config().match_on_age(true, 1.0).build();
    let records = vec![case(1, 0, &[5000]), person(2, 1000)];

    let table = sample(config, records, 1);

    assert_eq!(table.rows(), &[ResultRow::case(1, 5000, 1)]);
}

#[test]
fn test_age_caliper_limits_candidates() {
    let config = permissive_config().match_on_age(true, 1.0).build();
    let records = vec![
        case(1, 1000, &[5000]),
        person(2, 2000),
        person(3, 1300),
        person(4, 635),
        person(5, 634),
    ];

    let table = sample(config, records, 3);

    let mut controls: Vec<_> = table.controls().map(|row| row.person_id).collect();
    controls.sort_unstable();
    assert_eq!(controls, vec![3, 4]);
}

#[test]
fn test_first_outcome_only_opens_single_stratum() {
    let mut records = vec![case(1, 0, &[300, 100, 200])];
    records.extend((2..=6).map(|id| person(id, 0)));

    let config = permissive_config().first_outcome_only(true).build();
    let table = sample(config, records.clone(), 5);
    assert_eq!(table.cases().count(), 1);
    assert_eq!(table.rows()[0], ResultRow::case(1, 100, 1));

    let config = permissive_config().build();
    let table = sample(config, records, 5);
    let cases: Vec<_> = table.cases().map(|row| (row.date, row.stratum_id)).collect();
    assert_eq!(cases, vec![(100, 1), (200, 2), (300, 3)]);
}

#[test]
fn test_first_outcome_only_skips_washed_out_first_date() {
    let mut records = vec![case(1, 0, &[100, 400])];
    records.push(person(2, 0));

    let config = permissive_config()
        .first_outcome_only(true)
        .washout_period(180)
        .build();
    let table = sample(config, records, 5);

    assert_eq!(table.rows()[0], ResultRow::case(1, 400, 1));
    assert_eq!(table.cases().count(), 1);
}

#[test]
fn test_washout_boundary() {
    let config = permissive_config().washout_period(180).build();

    let table = sample(config.clone(), vec![case(1, 0, &[179]), person(2, 0)], 1);
    assert!(table.is_empty());

    let table = sample(config, vec![case(1, 0, &[180]), person(2, 0)], 1);
    assert_eq!(
        table.rows(),
        &[ResultRow::case(1, 180, 1), ResultRow::control(2, 180, 1)]
    );
}

#[test]
fn test_case_can_control_other_strata() {
    let config = permissive_config().controls_per_case(3).build();
    let records = vec![case(1, 0, &[500]), case(2, 0, &[800])];

    let table = sample(config, records, 9);

    assert_eq!(
        table.rows(),
        &[
            ResultRow::case(1, 500, 1),
            ResultRow::control(2, 500, 1),
            ResultRow::case(2, 800, 2),
            ResultRow::control(1, 800, 2),
        ]
    );
}

#[test]
fn test_exhaustive_fallback_finds_all_eligible() {
    // Only three candidates share the case's gender; with a single probe the
    // selector must rely on the exhaustive scan to find them.
    let mut records = vec![case(1, 0, &[500]), person(2, 0), person(3, 0), person(4, 0)];
    records.extend((10..60).map(|id| {
        let mut record = person(id, 0);
        record.gender_concept_id = FEMALE;
        record
    }));

    let config = permissive_config()
        .match_on_gender(true)
        .controls_per_case(3)
        .max_probe_iterations(1)
        .build();

    for seed in 0..5 {
        let table = sample(config.clone(), records.clone(), seed);
        let mut controls: Vec<_> = table.controls().map(|row| row.person_id).collect();
        controls.sort_unstable();
        assert_eq!(controls, vec![2, 3, 4]);
    }
}

#[test]
fn test_fewer_controls_than_requested() {
    let config = permissive_config().controls_per_case(5).build();
    let records = vec![case(1, 0, &[500]), person(2, 0), person(3, 0)];

    let sampler = NestedCaseControlSampler::new(config, records).unwrap();
    let table = sampler.select_controls_seeded(11).unwrap();
    assert_eq!(table.controls().count(), 2);

    let summary = sampler.summarize(&table);
    assert_eq!(summary.strata, 1);
    assert_eq!(summary.strata_partially_matched, 1);
    assert_eq!(summary.strata_fully_matched, 0);
}

#[test]
fn test_in_memory_cohort_source() {
    let cohort: InMemoryCohort = vec![case(1, 0, &[500]), person(2, 0)].into();
    let config = permissive_config().controls_per_case(1).build();

    let sampler = NestedCaseControlSampler::new(config, cohort).unwrap();
    assert_eq!(sampler.store().len(), 2);
    assert_eq!(sampler.build_stats().records_kept, 2);

    let table = sampler.select_controls_seeded(3).unwrap();
    assert_eq!(table.len(), 2);
}

#[test]
fn test_cohort_without_outcomes_yields_empty_table() {
    let records = (1..=10).map(|id| person(id, 0)).collect();
    let table = sample(permissive_config().build(), records, 1);
    assert!(table.is_empty());
}

#[test]
fn test_same_seed_same_table() {
    let records = synthetic_cohort(300, 21);
    let config = SamplingConfig::builder().washout_period(0).build();

    let first = sample(config.clone(), records.clone(), 99);
    let second = sample(config, records, 99);

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_parallel_is_deterministic_and_keeps_strata() {
    let records = synthetic_cohort(300, 22);
    let sequential_config = SamplingConfig::builder().washout_period(0).build();
    let parallel_config = SamplingConfig::builder()
        .washout_period(0)
        .use_parallel(true)
        .build();

    let parallel_a = sample(parallel_config.clone(), records.clone(), 5);
    let parallel_b = sample(parallel_config, records.clone(), 5);
    assert_eq!(parallel_a, parallel_b);
    assert_well_formed(&parallel_a, 2);

    let sequential = sample(sequential_config, records, 5);
    let case_rows = |table: &ncc_sampler::ResultTable| -> Vec<ResultRow> {
        table.cases().copied().collect()
    };
    assert_eq!(case_rows(&parallel_a), case_rows(&sequential));
}

#[test]
fn test_synthetic_run_is_well_formed() {
    let records = synthetic_cohort(500, 23);
    let config = SamplingConfig::builder().controls_per_case(4).build();

    let sampler = NestedCaseControlSampler::new(config, records).unwrap();
    let table = sampler.select_controls_seeded(1).unwrap();

    assert_well_formed(&table, 4);
    crate::utils::assert_controls_match(&sampler, &table);

    let summary = sampler.summarize(&table);
    assert_eq!(summary.strata, strata(&table).len());
    assert_eq!(summary.controls, table.controls().count());
    assert_eq!(
        summary.strata,
        summary.strata_without_controls
            + summary.strata_partially_matched
            + summary.strata_fully_matched
    );
}

#[test]
fn test_record_batch_matches_table() {
    let records = synthetic_cohort(100, 24);
    let sampler =
        NestedCaseControlSampler::new(SamplingConfig::builder().washout_period(0).build(), records)
            .unwrap();
    let table = sampler.select_controls_seeded(2).unwrap();

    let batch = table.to_record_batch().unwrap();
    assert_eq!(batch.num_rows(), table.len());
    assert_eq!(batch.schema().field(0).name(), "person_id");
}
