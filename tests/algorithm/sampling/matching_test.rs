//! Matching behaviour observed through complete sampling runs

use ncc_sampler::NestingCohortRecord;

use crate::utils::{FEMALE, MALE, case, permissive_config, person, sample};

fn control_ids(table: &ncc_sampler::ResultTable, stratum_id: u64) -> Vec<i64> {
    let mut ids: Vec<_> = table
        .stratum(stratum_id)
        .filter(|row| !row.is_case)
        .map(|row| row.person_id)
        .collect();
    ids.sort_unstable();
    ids
}

#[test]
fn test_outcome_on_index_date_excludes_control() {
    let records = vec![
        case(1, 0, &[500]),
        case(2, 0, &[500]),
        case(3, 0, &[400]),
        person(4, 0),
    ];

    let config = permissive_config().controls_per_case(3).build();
    let table = sample(config, records.clone(), 1);
    assert_eq!(control_ids(&table, 1), vec![3, 4]);

    let config = permissive_config()
        .controls_per_case(3)
        .first_outcome_only(true)
        .build();
    let table = sample(config, records, 1);
    assert_eq!(control_ids(&table, 1), vec![4]);
}

#[test]
fn test_control_must_be_at_risk_on_index_date() {
    let records = vec![
        case(1, 0, &[500]),
        NestingCohortRecord::new(2, MALE, 0, 600, 10_000, 0),
        NestingCohortRecord::new(3, MALE, 0, 0, 499, 0),
        NestingCohortRecord::new(4, MALE, 0, 0, 500, 0),
        NestingCohortRecord::new(5, MALE, 0, 500, 10_000, 0),
    ];
    let config = permissive_config().controls_per_case(4).build();
    let table = sample(config, records, 2);
    assert_eq!(control_ids(&table, 1), vec![4, 5]);
}

#[test]
fn test_control_washout_uses_own_observation_start() {
    let records = vec![
        case(1, 0, &[500]),
        NestingCohortRecord::new(2, MALE, 0, 0, 10_000, 400),
        NestingCohortRecord::new(3, MALE, 0, 0, 10_000, 300),
    ];
    let config = permissive_config()
        .washout_period(200)
        .controls_per_case(2)
        .build();
    let table = sample(config, records, 3);
    assert_eq!(control_ids(&table, 1), vec![3]);
}

#[test]
fn test_gender_matching() {
    let mut female = person(3, 0);
    female.gender_concept_id = FEMALE;
    let records = vec![case(1, 0, &[500]), person(2, 0), female];

    let config = permissive_config().match_on_gender(true).build();
    let table = sample(config, records.clone(), 4);
    assert_eq!(control_ids(&table, 1), vec![2]);

    let table = sample(permissive_config().build(), records, 4);
    assert_eq!(control_ids(&table, 1), vec![2, 3]);
}

#[test]
fn test_provider_matching_drops_unknown_providers() {
    let records = vec![
        case(1, 0, &[500]).with_provider(10),
        person(2, 0).with_provider(10),
        person(3, 0).with_provider(11),
        person(4, 0),
    ];
    let config = permissive_config()
        .match_on_provider(true)
        .controls_per_case(3)
        .build();
    let table = sample(config, records, 5);
    assert_eq!(control_ids(&table, 1), vec![2]);
}

#[test]
fn test_case_without_provider_is_not_processed() {
    let records = vec![case(1, 0, &[500]), person(2, 0).with_provider(10)];
    let config = permissive_config().match_on_provider(true).build();
    let table = sample(config, records, 5);
    assert!(table.is_empty());
}

#[test]
fn test_care_site_matching() {
    let records = vec![
        case(1, 0, &[500]).with_care_site(7),
        person(2, 0).with_care_site(8),
        person(3, 0).with_care_site(7),
    ];
    let config = permissive_config().match_on_care_site(true).build();
    let table = sample(config, records, 6);
    assert_eq!(control_ids(&table, 1), vec![3]);
}

#[test]
fn test_time_in_cohort_caliper() {
    let records = vec![
        NestingCohortRecord::new(1, MALE, 0, 100, 10_000, 0).with_index_dates(vec![500]),
        NestingCohortRecord::new(2, MALE, 0, 130, 10_000, 0),
        NestingCohortRecord::new(3, MALE, 0, 70, 10_000, 0),
        NestingCohortRecord::new(4, MALE, 0, 131, 10_000, 0),
    ];
    let config = permissive_config()
        .match_on_time_in_cohort(true, 30)
        .controls_per_case(3)
        .build();
    let table = sample(config, records, 7);
    assert_eq!(control_ids(&table, 1), vec![2, 3]);
}

#[test]
fn test_visit_date_matching_reports_visit() {
    let records = vec![
        case(1, 0, &[500]),
        person(2, 0).with_visit_dates(vec![600, 490, 520]),
        person(3, 0).with_visit_dates(vec![531]),
        person(4, 0),
    ];
    let config = permissive_config()
        .match_on_visit_date(true, 30)
        .controls_per_case(3)
        .build();
    let table = sample(config, records, 8);

    let controls: Vec<_> = table
        .controls()
        .map(|row| (row.person_id, row.date))
        .collect();
    assert_eq!(controls, vec![(2, 520)]);
}

#[test]
fn test_visit_on_index_date_matches() {
    let records = vec![case(1, 0, &[500]), person(2, 0).with_visit_dates(vec![500])];
    let config = permissive_config().match_on_visit_date(true, 0).build();
    let table = sample(config, records, 9);
    let controls: Vec<_> = table
        .controls()
        .map(|row| (row.person_id, row.date))
        .collect();
    assert_eq!(controls, vec![(2, 500)]);
}

#[test]
fn test_control_entry_chosen_by_index_date() {
    // Person 2 has two cohort entries; only the second covers the index date.
    let records = vec![
        case(1, 0, &[3000]),
        NestingCohortRecord::new(2, MALE, 0, 0, 1000, 0).with_visit_dates(vec![3010]),
        NestingCohortRecord::new(2, MALE, 0, 2000, 4000, 0).with_visit_dates(vec![3020]),
    ];
    let config = permissive_config().match_on_visit_date(true, 30).build();
    let table = sample(config, records, 10);
    let controls: Vec<_> = table
        .controls()
        .map(|row| (row.person_id, row.date))
        .collect();
    assert_eq!(controls, vec![(2, 3020)]);
}
