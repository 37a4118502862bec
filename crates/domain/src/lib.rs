#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod catalog;
mod error;
mod exercise;
mod name;
mod service;
mod session;
mod set;
mod statistics;

pub use error::{
    CreateError, DeleteError, ReadError, StorageError, UpdateError, ValidationError,
};
pub use exercise::{
    Exercise, ExerciseGroup, ExerciseRepository, ExerciseService, Muscle, MuscleError, MuscleKey,
    MuscleUpdate, Muscles, Property, Section, Stimulus, StimulusError, group_exercises,
};
pub use name::{Name, NameError};
pub use service::Service;
pub use session::{Session, SessionRepository, SessionService};
pub use set::{
    LoggedSet, NewSet, Reps, RepsError, Set, SetID, SetRepository, SetService, Weight,
    WeightError, best_reps_at_weight, best_set, is_new_pr, last_set,
};
pub use statistics::{
    Interval, ProgressPoint, StatsPeriod, StatsPeriodError, compute_stats, date_range,
    estimated_one_rep_max, exercise_progress, muscle_totals,
};
