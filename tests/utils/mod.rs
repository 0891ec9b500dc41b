//! Shared fixtures for integration tests

use std::collections::HashSet;

use ncc_sampler::algorithm::sampling::MatchCriteria;
use ncc_sampler::models::{Day, PersonId};
use ncc_sampler::{
    NestedCaseControlSampler, NestingCohortRecord, ResultRow, ResultTable, SamplingConfig,
    SamplingConfigBuilder,
};

/// Gender concept used for most fixture persons
pub const MALE: i64 = 8507;

/// Gender concept for the other fixture persons
pub const FEMALE: i64 = 8532;

/// A person observed from day 0 to day 10 000 with no outcomes
#[must_use]
pub fn person(person_id: PersonId, date_of_birth: Day) -> NestingCohortRecord {
    NestingCohortRecord::new(person_id, MALE, date_of_birth, 0, 10_000, 0)
}

/// A person with outcomes on the given dates
#[must_use]
pub fn case(person_id: PersonId, date_of_birth: Day, index_dates: &[Day]) -> NestingCohortRecord {
    person(person_id, date_of_birth).with_index_dates(index_dates.to_vec())
}

/// Builder with every filter off except the temporal ones
#[must_use]
pub fn permissive_config() -> SamplingConfigBuilder {
    SamplingConfig::builder()
        .washout_period(0)
        .match_on_age(false, 0.0)
        .match_on_gender(false)
}

/// Run the sampler over `records` with a fixed seed
pub fn sample(config: SamplingConfig, records: Vec<NestingCohortRecord>, seed: u64) -> ResultTable {
    NestedCaseControlSampler::new(config, records)
        .and_then(|sampler| sampler.select_controls_seeded(seed))
        .expect("sampling should succeed")
}

/// Rows grouped by stratum, in emission order
#[must_use]
pub fn strata(table: &ResultTable) -> Vec<Vec<ResultRow>> {
    let mut groups: Vec<Vec<ResultRow>> = Vec::new();
    for row in table.rows() {
        match groups.last_mut() {
            Some(group) if group[0].stratum_id == row.stratum_id => group.push(*row),
            _ => groups.push(vec![*row]),
        }
    }
    groups
}

/// Check the structural guarantees every result table must satisfy
pub fn assert_well_formed(table: &ResultTable, controls_per_case: usize) {
    let groups = strata(table);
    for (i, group) in groups.iter().enumerate() {
        assert_eq!(group[0].stratum_id, i as u64 + 1, "stratum ids are 1-based and contiguous");
        assert!(group[0].is_case, "each stratum opens with its case row");
        assert!(group[1..].iter().all(|row| !row.is_case), "one case per stratum");
        assert!(group.len() - 1 <= controls_per_case, "at most controls_per_case controls");

        let case_person = group[0].person_id;
        let mut seen = HashSet::new();
        for control in &group[1..] {
            assert_ne!(control.person_id, case_person, "a case never controls itself");
            assert!(seen.insert(control.person_id), "no person twice in a stratum");
        }
    }
}

/// Check every control against the match predicate and age caliper
pub fn assert_controls_match(sampler: &NestedCaseControlSampler, table: &ResultTable) {
    let config = sampler.config();
    let criteria = MatchCriteria::from_config(config);
    let records = sampler.store().records();

    for group in strata(table) {
        let case_row = group[0];
        let case = &sampler.case_index()[&case_row.person_id];

        for control in &group[1..] {
            let matched = records
                .iter()
                .filter(|record| record.person_id == control.person_id)
                .any(|record| {
                    let age_ok = !config.match_on_age
                        || (i64::from(record.date_of_birth) - i64::from(case.date_of_birth)).abs()
                            <= i64::from(config.age_caliper_days());
                    age_ok
                        && criteria
                            .is_match(record, case, case_row.date)
                            .event_date(case_row.date)
                            == Some(control.date)
                });
            assert!(
                matched,
                "control {} in stratum {} does not satisfy the match predicate",
                control.person_id, control.stratum_id
            );
        }
    }
}
