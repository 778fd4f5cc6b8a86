use std::sync::OnceLock;

use serde::Serialize;
use time::format_description::FormatItem;
use time::{Date, Duration};

use super::plant::PlantRecord;

/// Calendar-day format used by the remote store: `2026-3-7`, no zero padding.
/// The parser also accepts padded components, so `2026-03-07` round-trips.
pub fn plant_date_format() -> &'static [FormatItem<'static>] {
    static FORMAT: OnceLock<Vec<FormatItem<'static>>> = OnceLock::new();
    FORMAT.get_or_init(|| {
        time::format_description::parse("[year]-[month padding:none]-[day padding:none]")
            .expect("plant date format description should parse")
    })
}

pub fn parse_plant_date(raw: &str) -> Option<Date> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Date::parse(trimmed, plant_date_format()).ok()
}

pub fn format_plant_date(date: Date) -> String {
    date.format(plant_date_format())
        .expect("plant date formatting should never fail")
}

/// Intervals arrive as decimal-digit strings. Anything that does not parse to
/// a non-negative integer is treated as absent.
pub fn parse_interval_days(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|days| *days >= 0)
}

/// Core due rule: due when `last + interval <= today`, boundary inclusive.
/// Malformed or absent inputs fail closed to "not due" so that incomplete
/// records never produce spurious reminders.
pub fn is_due(last_action_date: &str, interval_days: &str, today: Date) -> bool {
    let Some(last) = parse_plant_date(last_action_date) else {
        return false;
    };
    let Some(days) = parse_interval_days(interval_days) else {
        return false;
    };
    match last.checked_add(Duration::days(days)) {
        Some(next_due) => next_due <= today,
        None => false,
    }
}

/// Derived reminder flags for one plant. Re-derivable from the record plus
/// today's date at any time; never authoritative.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct DueState {
    pub need_water: bool,
    pub need_fertilize: bool,
}

impl DueState {
    pub fn any(self) -> bool {
        self.need_water || self.need_fertilize
    }
}

pub fn evaluate(plant: &PlantRecord, today: Date) -> DueState {
    DueState {
        need_water: is_due(&plant.last_watered_date, &plant.watering_frequency, today),
        need_fertilize: is_due(
            &plant.last_fertilized_date,
            &plant.fertilizing_frequency,
            today,
        ),
    }
}

#[cfg(test)]
mod tests {
    use time::{Date, Duration, Month};

    use super::{format_plant_date, is_due, parse_interval_days, parse_plant_date};

    fn day(year: i32, month: Month, day: u8) -> Date {
        Date::from_calendar_date(year, month, day).expect("test date should be valid")
    }

    #[test]
    fn due_exactly_on_the_interval_boundary() {
        let today = day(2026, Month::March, 10);
        for interval in 1..30i64 {
            let last = today - Duration::days(interval);
            assert!(
                is_due(&format_plant_date(last), &interval.to_string(), today),
                "interval {interval} should be due on its boundary day"
            );
        }
    }

    #[test]
    fn not_due_one_day_before_the_boundary() {
        let today = day(2026, Month::March, 10);
        for interval in 1..30i64 {
            let last = today - Duration::days(interval - 1);
            assert!(
                !is_due(&format_plant_date(last), &interval.to_string(), today),
                "interval {interval} should not be due one day early"
            );
        }
    }

    #[test]
    fn due_every_day_after_the_boundary_until_reset() {
        // Watered on day 0 with a 3-day interval: quiet on days 1-2, due from
        // day 3 onward.
        let watered = day(2026, Month::May, 1);
        for offset in 1..10i64 {
            let today = watered + Duration::days(offset);
            assert_eq!(is_due("2026-5-1", "3", today), offset >= 3);
        }
    }

    #[test]
    fn empty_last_date_is_never_due() {
        let today = day(2026, Month::March, 10);
        assert!(!is_due("", "1", today));
        assert!(!is_due("   ", "1", today));
    }

    #[test]
    fn malformed_inputs_fail_closed() {
        let today = day(2026, Month::March, 10);
        assert!(!is_due("not-a-date", "3", today));
        assert!(!is_due("2020-1-1", "", today));
        assert!(!is_due("2020-1-1", "weekly", today));
        assert!(!is_due("2020-1-1", "-3", today));
    }

    #[test]
    fn missing_frequency_never_due_even_for_ancient_dates() {
        let today = day(2026, Month::March, 10);
        assert!(!is_due("1999-1-1", "", today));
    }

    #[test]
    fn zero_interval_is_due_from_the_action_day() {
        let today = day(2026, Month::March, 10);
        assert!(is_due("2026-3-10", "0", today));
        assert!(!is_due("2026-3-11", "0", today));
    }

    #[test]
    fn parses_padded_and_unpadded_dates() {
        let expected = day(2024, Month::May, 3);
        assert_eq!(parse_plant_date("2024-5-3"), Some(expected));
        assert_eq!(parse_plant_date("2024-05-03"), Some(expected));
        assert_eq!(parse_plant_date("2024/05/03"), None);
    }

    #[test]
    fn formats_dates_without_padding() {
        assert_eq!(format_plant_date(day(2024, Month::May, 3)), "2024-5-3");
    }

    #[test]
    fn interval_parsing_rejects_non_digits_and_negatives() {
        assert_eq!(parse_interval_days("14"), Some(14));
        assert_eq!(parse_interval_days(" 7 "), Some(7));
        assert_eq!(parse_interval_days("7.5"), None);
        assert_eq!(parse_interval_days("-1"), None);
        assert_eq!(parse_interval_days(""), None);
    }
}
