use chrono::{Datelike, Days, NaiveDate, Weekday};
use itertools::Itertools;
use rand::Rng;

pub const CALENDAR_DAYS: u64 = 365;
pub const MAX_LEVEL: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContributionDay {
    pub date: NaiveDate,
    pub level: u8,
}

/// Plausible-looking activity for the year ending `today`, oldest day first.
/// Weekdays are busy, weekends mostly quiet, and about one day in ten is off.
pub fn generate<R: Rng + ?Sized>(today: NaiveDate, rng: &mut R) -> Vec<ContributionDay> {
    (0..CALENDAR_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| {
            let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
            let holiday = rng.gen_bool(0.1);

            let level = if holiday {
                0
            } else if weekend {
                if rng.gen_bool(0.3) {
                    rng.gen_range(0..3)
                } else {
                    0
                }
            } else if rng.gen_bool(0.8) {
                rng.gen_range(1..=MAX_LEVEL)
            } else {
                0
            };

            ContributionDay { date, level }
        })
        .collect()
}

/// Display bucket for a level
pub fn bucket(level: u8) -> u8 {
    level.min(MAX_LEVEL)
}

/// Split the calendar into week columns, Sunday first
pub fn weeks(days: &[ContributionDay]) -> Vec<Vec<ContributionDay>> {
    let Some(first) = days.first() else {
        return Vec::new();
    };
    let lead = first.date.weekday().num_days_from_sunday() as usize;

    days.iter()
        .enumerate()
        .chunk_by(move |(i, _)| (i + lead) / 7)
        .into_iter()
        .map(|(_, week)| week.map(|(_, day)| *day).collect())
        .collect()
}
