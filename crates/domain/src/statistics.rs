use std::collections::{BTreeMap, btree_map::Entry};

use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use derive_more::Display;

use crate::{Exercise, MuscleKey, Reps, Set, Stimulus, Weight};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl Interval {
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }
}

impl From<std::ops::RangeInclusive<NaiveDate>> for Interval {
    fn from(value: std::ops::RangeInclusive<NaiveDate>) -> Self {
        Interval {
            first: *value.start(),
            last: *value.end(),
        }
    }
}

#[derive(Debug, Default, Display, Clone, Copy, PartialEq, Eq)]
pub enum StatsPeriod {
    #[default]
    #[display("week")]
    Week,
    #[display("month")]
    Month,
    #[display("year")]
    Year,
}

impl StatsPeriod {
    /// The calendar window of the period containing `today`.
    ///
    /// Weeks start on Monday.
    #[must_use]
    pub fn interval(self, today: NaiveDate) -> Interval {
        match self {
            StatsPeriod::Week => {
                let first =
                    today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
                (first..=first + Duration::days(6)).into()
            }
            StatsPeriod::Month => {
                let first = today.with_day(1).unwrap_or(today);
                let last = first
                    .checked_add_months(Months::new(1))
                    .and_then(|d| d.pred_opt())
                    .unwrap_or(today);
                (first..=last).into()
            }
            StatsPeriod::Year => {
                let first = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                let last = NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today);
                (first..=last).into()
            }
        }
    }
}

impl TryFrom<&str> for StatsPeriod {
    type Error = StatsPeriodError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "week" => Ok(StatsPeriod::Week),
            "month" => Ok(StatsPeriod::Month),
            "year" => Ok(StatsPeriod::Year),
            _ => Err(StatsPeriodError::Unknown(value.to_string())),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum StatsPeriodError {
    #[error("Unknown period \"{0}\"")]
    Unknown(String),
}

/// The interval of `period` relative to the local date.
#[must_use]
pub fn date_range(period: StatsPeriod) -> Interval {
    period.interval(Local::now().date_naive())
}

/// Sum up the muscle stimuli of all sets of `user` within `interval`.
///
/// Sets of unknown exercises and sets with an invalid date are ignored.
#[must_use]
pub fn muscle_totals(
    sets: &[Set],
    exercises: &[Exercise],
    interval: &Interval,
    user: &str,
) -> BTreeMap<MuscleKey, Stimulus> {
    let exercises = exercises
        .iter()
        .map(|e| (e.name.as_str(), e))
        .collect::<BTreeMap<_, _>>();
    let mut totals: BTreeMap<MuscleKey, Stimulus> = BTreeMap::new();

    for set in sets
        .iter()
        .filter(|s| s.user == user && s.day().is_some_and(|d| interval.contains(d)))
    {
        let Some(exercise) = exercises.get(set.exercise.as_str()) else {
            continue;
        };
        for (muscle, stimulus) in &exercise.muscles {
            *totals.entry(muscle.clone()).or_default() += *stimulus;
        }
    }

    totals
}

#[must_use]
pub fn compute_stats(
    sets: &[Set],
    exercises: &[Exercise],
    period: StatsPeriod,
    user: &str,
) -> BTreeMap<MuscleKey, Stimulus> {
    muscle_totals(sets, exercises, &date_range(period), user)
}

/// Estimate the one-rep max using the Epley formula.
///
/// Sets without reps count as a single maximum effort.
#[must_use]
pub fn estimated_one_rep_max(weight: Weight, reps: Option<Reps>) -> f64 {
    let weight = f64::from(weight);
    match reps.map(u32::from) {
        None | Some(0) => weight,
        Some(reps) => weight * (1.0 + f64::from(reps) / 30.0),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressPoint {
    pub date: String,
    pub e1rm: f64,
    pub reps: Option<Reps>,
    pub weight: Weight,
}

/// The set with the highest estimated one-rep max per day, in ascending date order.
#[must_use]
pub fn exercise_progress(sets: &[Set], exercise: &str, user: &str) -> Vec<ProgressPoint> {
    let mut best: BTreeMap<&str, (&Set, f64)> = BTreeMap::new();

    for set in sets
        .iter()
        .filter(|s| s.exercise == exercise && s.user == user)
    {
        let e1rm = estimated_one_rep_max(set.weight, set.reps);
        match best.entry(set.date.as_str()) {
            Entry::Vacant(entry) => {
                entry.insert((set, e1rm));
            }
            Entry::Occupied(mut entry) => {
                if e1rm > entry.get().1 {
                    entry.insert((set, e1rm));
                }
            }
        }
    }

    best.into_iter()
        .map(|(date, (set, e1rm))| ProgressPoint {
            date: date.to_string(),
            e1rm: (e1rm * 10.0).round() / 10.0,
            reps: set.reps,
            weight: set.weight,
        })
        .collect()
}
