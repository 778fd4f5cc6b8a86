use std::collections::BTreeMap;

use serde::Serialize;
use time::{Date, Duration};

use crate::db::TypeCount;
use crate::domain::plant::PlantRecord;
use crate::domain::schedule;

/// Aggregate view over the local cache, mirroring the summary charts of the
/// original tracker: plant counts per type plus care load per planting week.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlantStats {
    pub plants: u64,
    pub type_counts: Vec<TypeCount>,
    pub weekly_care_load: Vec<WeekLoad>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WeekLoad {
    pub label: String,
    pub week_start: String,
    pub water_count: i64,
    pub fertilize_count: i64,
}

/// Groups plants by the Monday of their planting week and sums the declared
/// frequencies. Records with unparseable planting dates are left out;
/// unparseable frequencies count as zero, matching the field-level leniency
/// used everywhere else.
pub fn weekly_care_load(plants: &[PlantRecord]) -> Vec<WeekLoad> {
    let mut by_week: BTreeMap<Date, (i64, i64)> = BTreeMap::new();
    for plant in plants {
        let Some(planted) = schedule::parse_plant_date(&plant.planting_date) else {
            continue;
        };
        let week_start = monday_of(planted);
        let entry = by_week.entry(week_start).or_insert((0, 0));
        entry.0 += schedule::parse_interval_days(&plant.watering_frequency).unwrap_or(0);
        entry.1 += schedule::parse_interval_days(&plant.fertilizing_frequency).unwrap_or(0);
    }

    by_week
        .into_iter()
        .enumerate()
        .map(|(index, (week_start, (water, fertilize)))| WeekLoad {
            label: format!("Week {}", index + 1),
            week_start: schedule::format_plant_date(week_start),
            water_count: water,
            fertilize_count: fertilize,
        })
        .collect()
}

fn monday_of(date: Date) -> Date {
    let days_from_monday = i64::from(date.weekday().number_days_from_monday());
    date.checked_sub(Duration::days(days_from_monday))
        .unwrap_or(date)
}
