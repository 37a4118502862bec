use std::{
    cmp::Ordering,
    collections::BTreeMap,
    fmt,
    ops::{Add, AddAssign},
    slice::Iter,
};

use derive_more::{Deref, Display};

use crate::{CreateError, Name, ReadError, UpdateError, ValidationError};

#[allow(async_fn_in_trait)]
pub trait ExerciseService {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn create_exercise(&self, name: Name) -> Result<Exercise, CreateError>;
    async fn update_exercise_muscles(
        &self,
        name: &str,
        update: MuscleUpdate,
    ) -> Result<Exercise, UpdateError>;

    async fn validate_exercise_name(&self, name: &str) -> Result<Name, ValidationError> {
        match Name::new(name) {
            Ok(name) => match self.get_exercises().await {
                Ok(exercises) => {
                    if exercises.iter().all(|e| e.name != name.as_str()) {
                        Ok(name)
                    } else {
                        Err(ValidationError::Conflict("name".to_string()))
                    }
                }
                Err(err) => Err(ValidationError::Other(err.into())),
            },
            Err(err) => Err(ValidationError::Other(err.into())),
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn create_exercise(&self, name: Name) -> Result<Exercise, CreateError>;
    async fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError>;
}

pub type Muscles = BTreeMap<MuscleKey, Stimulus>;

/// A named movement. The name is the case-sensitive key sets refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub name: String,
    pub muscles: Muscles,
}

impl Exercise {
    #[must_use]
    pub fn new(name: Name) -> Self {
        Self {
            name: name.into(),
            muscles: Muscles::new(),
        }
    }

    /// The muscle with the highest stimulus.
    ///
    /// On a tie the muscle that comes first in key order wins, i.e. known muscles in the order of
    /// [`Muscle::iter`], followed by unmapped keys in lexical order.
    #[must_use]
    pub fn dominant_muscle(&self) -> Option<&MuscleKey> {
        self.muscles
            .iter()
            .fold(None::<(&MuscleKey, Stimulus)>, |dominant, (key, stimulus)| {
                match dominant {
                    Some((_, max)) if *stimulus <= max => dominant,
                    _ => Some((key, *stimulus)),
                }
            })
            .map(|(key, _)| key)
    }

    #[must_use]
    pub fn section(&self) -> Section {
        self.dominant_muscle().map_or(Section::Other, MuscleKey::section)
    }

    pub fn update_muscles(&mut self, update: MuscleUpdate) {
        match update {
            MuscleUpdate::Replace(muscles) => self.muscles = muscles,
            MuscleUpdate::Merge(muscles) => self.muscles.extend(muscles),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MuscleUpdate {
    Replace(Muscles),
    /// Supplied muscles overwrite existing entries, all other entries are retained.
    Merge(Muscles),
}

#[derive(Deref, Debug, Default, Display, Clone, Copy, PartialEq, PartialOrd)]
pub struct Stimulus(f64);

impl Stimulus {
    pub const PRIMARY: Stimulus = Stimulus(1.0);
    pub const SECONDARY: Stimulus = Stimulus(0.5);
    pub const NONE: Stimulus = Stimulus(0.0);

    pub fn new(value: f64) -> Result<Self, StimulusError> {
        if !value.is_finite() || value < 0.0 {
            return Err(StimulusError::OutOfRange(value));
        }
        Ok(Self(value))
    }
}

impl Add for Stimulus {
    type Output = Stimulus;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Stimulus {
    fn add_assign(&mut self, rhs: Self) {
        *self = Self(self.0 + rhs.0);
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum StimulusError {
    #[error("Stimulus must be a non-negative number ({0})")]
    OutOfRange(f64),
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Muscle {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Quads,
    Hamstrings,
    Glutes,
    Calves,
    Abs,
    RearDelts,
    LowBack,
}

impl Property for Muscle {
    fn iter() -> Iter<'static, Muscle> {
        static MUSCLES: [Muscle; 12] = [
            Muscle::Chest,
            Muscle::Back,
            Muscle::Shoulders,
            Muscle::Biceps,
            Muscle::Triceps,
            Muscle::Quads,
            Muscle::Hamstrings,
            Muscle::Glutes,
            Muscle::Calves,
            Muscle::Abs,
            Muscle::RearDelts,
            Muscle::LowBack,
        ];
        MUSCLES.iter()
    }

    fn name(self) -> &'static str {
        match self {
            Muscle::Chest => "Chest",
            Muscle::Back => "Back",
            Muscle::Shoulders => "Shoulders",
            Muscle::Biceps => "Biceps",
            Muscle::Triceps => "Triceps",
            Muscle::Quads => "Quads",
            Muscle::Hamstrings => "Hamstrings",
            Muscle::Glutes => "Glutes",
            Muscle::Calves => "Calves",
            Muscle::Abs => "Abs",
            Muscle::RearDelts => "Rear Delts",
            Muscle::LowBack => "Low Back",
        }
    }
}

impl Muscle {
    /// Key used in the persisted muscle profile.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Muscle::Chest => "chest",
            Muscle::Back => "back",
            Muscle::Shoulders => "shoulders",
            Muscle::Biceps => "biceps",
            Muscle::Triceps => "triceps",
            Muscle::Quads => "quads",
            Muscle::Hamstrings => "hamstrings",
            Muscle::Glutes => "glutes",
            Muscle::Calves => "calves",
            Muscle::Abs => "abs",
            Muscle::RearDelts => "rearDelts",
            Muscle::LowBack => "lowBack",
        }
    }

    #[must_use]
    pub fn section(self) -> Section {
        #[allow(clippy::match_same_arms)]
        match self {
            Muscle::Chest => Section::Chest,
            Muscle::Back | Muscle::RearDelts => Section::Back,
            Muscle::Shoulders => Section::Shoulders,
            Muscle::Biceps | Muscle::Triceps => Section::Arms,
            Muscle::Quads | Muscle::Hamstrings | Muscle::Glutes | Muscle::Calves => Section::Legs,
            Muscle::Abs | Muscle::LowBack => Section::Core,
        }
    }
}

impl TryFrom<&str> for Muscle {
    type Error = MuscleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Muscle::iter()
            .find(|m| m.key() == value)
            .copied()
            .ok_or_else(|| MuscleError::Unknown(value.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum MuscleError {
    #[error("Unknown muscle \"{0}\"")]
    Unknown(String),
}

/// Key of a muscle profile entry.
///
/// Keys outside the fixed muscle enumeration are kept as `Unmapped`. They still count for
/// statistics, but put an exercise into the "Other" section when they dominate it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MuscleKey {
    Known(Muscle),
    Unmapped(String),
}

impl MuscleKey {
    #[must_use]
    pub fn section(&self) -> Section {
        match self {
            MuscleKey::Known(muscle) => muscle.section(),
            MuscleKey::Unmapped(_) => Section::Other,
        }
    }
}

impl From<Muscle> for MuscleKey {
    fn from(value: Muscle) -> Self {
        MuscleKey::Known(value)
    }
}

impl From<&str> for MuscleKey {
    fn from(value: &str) -> Self {
        match Muscle::try_from(value) {
            Ok(muscle) => MuscleKey::Known(muscle),
            Err(_) => MuscleKey::Unmapped(value.to_string()),
        }
    }
}

impl fmt::Display for MuscleKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MuscleKey::Known(muscle) => write!(f, "{}", muscle.key()),
            MuscleKey::Unmapped(key) => write!(f, "{key}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Section {
    Chest,
    Back,
    Shoulders,
    Arms,
    Legs,
    Core,
    Other,
}

impl Property for Section {
    fn iter() -> Iter<'static, Section> {
        static SECTIONS: [Section; 7] = [
            Section::Chest,
            Section::Back,
            Section::Shoulders,
            Section::Arms,
            Section::Legs,
            Section::Core,
            Section::Other,
        ];
        SECTIONS.iter()
    }

    fn name(self) -> &'static str {
        match self {
            Section::Chest => "Chest",
            Section::Back => "Back",
            Section::Shoulders => "Shoulders",
            Section::Arms => "Arms",
            Section::Legs => "Legs",
            Section::Core => "Core",
            Section::Other => "Other",
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct ExerciseGroup<'a> {
    pub section: Section,
    pub exercises: Vec<&'a Exercise>,
}

/// Group exercises into body-region sections.
///
/// Sections are returned in the order of [`Section::iter`]. Sections without any exercise are
/// omitted.
#[must_use]
pub fn group_exercises(exercises: &[Exercise]) -> Vec<ExerciseGroup<'_>> {
    let mut sections: BTreeMap<Section, Vec<&Exercise>> = BTreeMap::new();

    for exercise in exercises {
        sections.entry(exercise.section()).or_default().push(exercise);
    }

    Section::iter()
        .filter_map(|section| {
            let mut exercises = sections.remove(section)?;
            exercises.sort_by(|a, b| compare_names(&a.name, &b.name));
            Some(ExerciseGroup {
                section: *section,
                exercises,
            })
        })
        .collect()
}

/// Case-insensitive, lowercase before uppercase on equal letters.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

pub trait Property: Clone + Copy + Sized {
    fn iter() -> Iter<'static, Self>;
    fn name(self) -> &'static str;
}
