use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use derive_more::{Deref, Display, Into};
use uuid::Uuid;

use crate::{CreateError, DeleteError, ReadError, ValidationError};

#[allow(async_fn_in_trait)]
pub trait SetService {
    async fn get_sets(&self) -> Result<Vec<Set>, ReadError>;
    /// Store a new set and report whether it beats the previous history.
    async fn log_set(&self, set: NewSet) -> Result<LoggedSet, CreateError>;
    async fn delete_set(&self, id: SetID) -> Result<SetID, DeleteError>;

    fn validate_reps(&self, value: &str) -> Result<Option<Reps>, ValidationError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        Reps::try_from(value)
            .map(Some)
            .map_err(|err| ValidationError::Other(err.into()))
    }

    fn validate_weight(&self, value: &str) -> Result<Weight, ValidationError> {
        Weight::try_from(value.trim()).map_err(|err| ValidationError::Other(err.into()))
    }
}

#[allow(async_fn_in_trait)]
pub trait SetRepository {
    async fn read_sets(&self) -> Result<Vec<Set>, ReadError>;
    async fn create_set(&self, set: Set) -> Result<Set, CreateError>;
    async fn delete_set(&self, id: SetID) -> Result<SetID, DeleteError>;
}

/// One recorded performance of an exercise.
///
/// `date` is the logical day of the set in `YYYY-MM-DD` format, `created_at` the ISO 8601
/// timestamp of saving. Both are kept verbatim so that persisted rows can be read and written
/// without loss.
#[derive(Debug, Clone, PartialEq)]
pub struct Set {
    pub id: SetID,
    pub date: String,
    pub user: String,
    pub exercise: String,
    pub reps: Option<Reps>,
    pub weight: Weight,
    pub notes: String,
    pub created_at: String,
}

impl Set {
    #[must_use]
    pub fn new(set: NewSet, id: SetID, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            date: set.date.format("%Y-%m-%d").to_string(),
            user: set.user,
            exercise: set.exercise,
            reps: set.reps,
            weight: set.weight,
            notes: set.notes,
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    #[must_use]
    pub fn day(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// Timestamps without a UTC offset are interpreted as UTC.
    #[must_use]
    pub fn created_at_instant(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"]
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(&self.created_at, fmt).ok())
                    .map(|dt| dt.and_utc())
            })
    }

    fn matches(&self, exercise: &str, user: &str) -> bool {
        self.exercise == exercise && self.user == user
    }
}

#[derive(Deref, Debug, Default, Display, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SetID(String);

impl SetID {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl AsRef<str> for SetID {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for SetID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SetID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A set as submitted by the user, before it gets an id and a timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSet {
    pub date: NaiveDate,
    pub user: String,
    pub exercise: String,
    pub reps: Option<Reps>,
    pub weight: Weight,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggedSet {
    pub set: Set,
    pub new_pr: bool,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reps(u32);

impl Reps {
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self(value)
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<u32>() {
            Ok(parsed_value) => Ok(Reps::new(parsed_value)),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be a non-negative integer")]
    ParseError,
}

/// Weight in lbs.
#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f64);

impl Weight {
    pub fn new(value: f64) -> Result<Self, WeightError> {
        if !value.is_finite() || value < 0.0 {
            return Err(WeightError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<f64>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must be a non-negative number")]
    OutOfRange,
    #[error("Weight must be a decimal")]
    ParseError,
}

/// The heaviest set with at least five reps, ties broken by reps.
#[must_use]
pub fn best_set<'a>(sets: &'a [Set], exercise: &str, user: &str) -> Option<&'a Set> {
    first_max_by_key(
        sets.iter()
            .filter(|s| s.matches(exercise, user) && s.reps.is_some_and(|r| r >= Reps(5))),
        |s| (s.weight, s.reps),
    )
}

/// The most recently saved set, regardless of reps.
///
/// Sets with an unparseable timestamp rank below all others.
#[must_use]
pub fn last_set<'a>(sets: &'a [Set], exercise: &str, user: &str) -> Option<&'a Set> {
    first_max_by_key(
        sets.iter().filter(|s| s.matches(exercise, user)),
        Set::created_at_instant,
    )
}

#[must_use]
pub fn best_reps_at_weight<'a>(
    sets: &'a [Set],
    exercise: &str,
    user: &str,
    weight: Weight,
) -> Option<&'a Set> {
    first_max_by_key(
        sets.iter()
            .filter(|s| s.matches(exercise, user) && s.weight == weight && s.reps.is_some()),
        |s| s.reps,
    )
}

/// Check whether a candidate set beats all previous sets at exactly the same weight.
///
/// `sets` must not contain the candidate itself, otherwise the candidate ties with itself.
#[must_use]
pub fn is_new_pr(
    sets: &[Set],
    exercise: &str,
    user: &str,
    weight: Weight,
    reps: Option<Reps>,
) -> bool {
    let Some(reps) = reps else {
        return false;
    };

    best_reps_at_weight(sets, exercise, user, weight)
        .and_then(|s| s.reps)
        .is_some_and(|best| reps > best)
}

/// Like `Iterator::max_by_key`, but keeps the first of equal elements and accepts partially
/// ordered keys.
fn first_max_by_key<'a, K: PartialOrd>(
    sets: impl Iterator<Item = &'a Set>,
    key: impl Fn(&Set) -> K,
) -> Option<&'a Set> {
    sets.fold(None::<(&'a Set, K)>, |max, set| {
        let k = key(set);
        if max.as_ref().is_none_or(|(_, m)| k > *m) {
            Some((set, k))
        } else {
            max
        }
    })
    .map(|(set, _)| set)
}
