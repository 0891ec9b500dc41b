//! Synthetic nesting cohort generation

use chrono::NaiveDate;
use log::info;
use rand::Rng;

use super::config::SyntheticCohortConfig;
use crate::models::{Day, NestingCohortRecord, day_from_date};

/// Gender concepts drawn for synthetic persons
pub const GENDER_CONCEPTS: [i64; 2] = [8507, 8532];

/// Generate a synthetic nesting cohort
///
/// Persons get ids `1..=persons`. Each person has one or more
/// non-overlapping cohort entries inside the study period, each preceded by
/// up to two years of observation. The same generator state always yields
/// the same cohort.
pub fn generate_cohort<R: Rng + ?Sized>(
    config: &SyntheticCohortConfig,
    rng: &mut R,
) -> Vec<NestingCohortRecord> {
    let study_start = day_from_date(config.study_start_date);
    let study_end = day_from_date(config.study_end_date);
    let birth_start = year_start(config.min_birth_year, study_start);
    let birth_end = year_start(config.max_birth_year.saturating_add(1), study_start) - 1;

    let mut records = Vec::with_capacity(config.persons * config.max_entries_per_person.max(1));

    for person_id in 1..=config.persons as i64 {
        let gender = GENDER_CONCEPTS[rng.random_range(0..GENDER_CONCEPTS.len())];
        let date_of_birth = rng.random_range(birth_start..=birth_end.max(birth_start));

        let mut start_date = study_start + rng.random_range(0..365);
        for _ in 0..config.max_entries_per_person.max(1) {
            if start_date > study_end {
                break;
            }
            let end_date = (start_date + rng.random_range(180..=1460)).min(study_end);
            let observation_start = start_date - rng.random_range(0..=730);

            let mut record = NestingCohortRecord::new(
                person_id,
                gender,
                date_of_birth,
                start_date,
                end_date,
                observation_start,
            );
            record.provider_id = draw_optional_id(rng, config.provider_count, config.missing_provider_rate);
            record.care_site_id =
                draw_optional_id(rng, config.care_site_count, config.missing_care_site_rate);

            if rng.random_bool(config.outcome_rate.clamp(0.0, 1.0)) {
                let count = rng.random_range(1..=config.max_outcomes_per_entry.max(1));
                record.index_dates = (0..count)
                    .map(|_| rng.random_range(start_date..=end_date))
                    .collect();
            }

            if config.with_visits {
                record.visit_dates = Some(draw_visits(
                    rng,
                    observation_start,
                    end_date,
                    config.visits_per_year,
                ));
            }

            records.push(record);
            start_date = end_date + rng.random_range(30..=365);
        }
    }

    info!(
        "Generated {} cohort entries for {} synthetic persons",
        records.len(),
        config.persons
    );
    records
}

fn year_start(year: i32, fallback: Day) -> Day {
    NaiveDate::from_ymd_opt(year, 1, 1).map_or(fallback, day_from_date)
}

fn draw_optional_id<R: Rng + ?Sized>(rng: &mut R, count: i64, missing_rate: f64) -> Option<i64> {
    if count < 1 || rng.random_bool(missing_rate.clamp(0.0, 1.0)) {
        None
    } else {
        Some(rng.random_range(1..=count))
    }
}

fn draw_visits<R: Rng + ?Sized>(rng: &mut R, from: Day, to: Day, per_year: f64) -> Vec<Day> {
    let years = f64::from(to - from + 1) / 365.25;
    let count = (years * per_year.max(0.0)).round() as usize;
    let mut visits: Vec<Day> = (0..count).map(|_| rng.random_range(from..=to)).collect();
    visits.sort_unstable();
    visits.dedup();
    visits
}
