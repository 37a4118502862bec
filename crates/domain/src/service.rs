use chrono::Utc;
use log::{debug, error};

use crate::{
    CreateError, DeleteError, Exercise, ExerciseRepository, ExerciseService, LoggedSet,
    MuscleUpdate, Name, NewSet, ReadError, Session, SessionRepository, SessionService, Set, SetID,
    SetRepository, SetService, UpdateError, is_new_pr,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: SessionRepository> SessionService for Service<R> {
    async fn sign_in(&self, session: Session) -> Result<Session, ReadError> {
        log_on_error!(
            self.repository.request_session(session),
            ReadError,
            "request",
            "session"
        )
    }

    async fn get_session(&self) -> Result<Session, ReadError> {
        log_on_error!(
            self.repository.initialize_session(),
            ReadError,
            "get",
            "session"
        )
    }

    async fn sign_out(&self) -> Result<(), DeleteError> {
        log_on_error!(
            self.repository.delete_session(),
            DeleteError,
            "delete",
            "session"
        )
    }
}

impl<R: SetRepository> SetService for Service<R> {
    async fn get_sets(&self) -> Result<Vec<Set>, ReadError> {
        log_on_error!(self.repository.read_sets(), ReadError, "get", "sets")
    }

    async fn log_set(&self, set: NewSet) -> Result<LoggedSet, CreateError> {
        log_on_error!(
            async {
                let sets = self.repository.read_sets().await?;
                let new_pr = is_new_pr(&sets, &set.exercise, &set.user, set.weight, set.reps);
                let set = self
                    .repository
                    .create_set(Set::new(set, SetID::random(), Utc::now()))
                    .await?;
                Ok::<_, CreateError>(LoggedSet { set, new_pr })
            },
            CreateError,
            "log",
            "set"
        )
    }

    async fn delete_set(&self, id: SetID) -> Result<SetID, DeleteError> {
        log_on_error!(
            self.repository.delete_set(id),
            DeleteError,
            "delete",
            "set"
        )
    }
}

impl<R: ExerciseRepository> ExerciseService for Service<R> {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
        log_on_error!(
            self.repository.read_exercises(),
            ReadError,
            "get",
            "exercises"
        )
    }

    async fn create_exercise(&self, name: Name) -> Result<Exercise, CreateError> {
        log_on_error!(
            self.repository.create_exercise(name),
            CreateError,
            "create",
            "exercise"
        )
    }

    async fn update_exercise_muscles(
        &self,
        name: &str,
        update: MuscleUpdate,
    ) -> Result<Exercise, UpdateError> {
        log_on_error!(
            async {
                let mut exercise = self
                    .repository
                    .read_exercises()
                    .await?
                    .into_iter()
                    .find(|e| e.name == name)
                    .ok_or(UpdateError::NotFound)?;
                exercise.update_muscles(update);
                self.repository.replace_exercise(exercise).await
            },
            UpdateError,
            "update",
            "exercise"
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::NaiveDate;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{Muscle, MuscleKey, Muscles, Reps, Stimulus, StorageError, Weight};

    use super::*;

    #[derive(Default)]
    struct Repository {
        sets: Mutex<Vec<Set>>,
        exercises: Mutex<Vec<Exercise>>,
        session: Mutex<Option<Session>>,
    }

    impl SetRepository for Repository {
        async fn read_sets(&self) -> Result<Vec<Set>, ReadError> {
            Ok(self.sets.lock().unwrap().clone())
        }

        async fn create_set(&self, set: Set) -> Result<Set, CreateError> {
            self.sets.lock().unwrap().push(set.clone());
            Ok(set)
        }

        async fn delete_set(&self, id: SetID) -> Result<SetID, DeleteError> {
            self.sets.lock().unwrap().retain(|s| s.id != id);
            Ok(id)
        }
    }

    impl ExerciseRepository for Repository {
        async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
            Ok(self.exercises.lock().unwrap().clone())
        }

        async fn create_exercise(&self, name: Name) -> Result<Exercise, CreateError> {
            let exercise = Exercise::new(name);
            self.exercises.lock().unwrap().push(exercise.clone());
            Ok(exercise)
        }

        async fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError> {
            let mut exercises = self.exercises.lock().unwrap();
            let existing = exercises
                .iter_mut()
                .find(|e| e.name == exercise.name)
                .ok_or(UpdateError::NotFound)?;
            *existing = exercise.clone();
            Ok(exercise)
        }
    }

    impl SessionRepository for Repository {
        async fn request_session(&self, session: Session) -> Result<Session, ReadError> {
            *self.session.lock().unwrap() = Some(session.clone());
            Ok(session)
        }

        async fn initialize_session(&self) -> Result<Session, ReadError> {
            self.session
                .lock()
                .unwrap()
                .clone()
                .ok_or(ReadError::Storage(StorageError::NoSession))
        }

        async fn delete_session(&self) -> Result<(), DeleteError> {
            *self.session.lock().unwrap() = None;
            Ok(())
        }
    }

    fn new_set(weight: f64, reps: Option<u32>) -> NewSet {
        NewSet {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            user: "Ethan".to_string(),
            exercise: "Bench Press".to_string(),
            reps: reps.map(Reps::new),
            weight: Weight::new(weight).unwrap(),
            notes: String::new(),
        }
    }

    fn stimulus(value: f64) -> Stimulus {
        Stimulus::new(value).unwrap()
    }

    #[rstest]
    #[case::first_set(&[], 135.0, Some(8), false)]
    #[case::more_reps(&[(135.0, Some(8))], 135.0, Some(9), true)]
    #[case::equal_reps(&[(135.0, Some(8))], 135.0, Some(8), false)]
    #[case::other_weight(&[(135.0, Some(8))], 140.0, Some(9), false)]
    #[case::no_reps(&[(135.0, Some(8))], 135.0, None, false)]
    fn test_log_set(
        #[case] history: &[(f64, Option<u32>)],
        #[case] weight: f64,
        #[case] reps: Option<u32>,
        #[case] new_pr: bool,
    ) {
        let service = Service::new(Repository::default());
        for (weight, reps) in history {
            block_on(service.log_set(new_set(*weight, *reps))).unwrap();
        }

        let logged = block_on(service.log_set(new_set(weight, reps))).unwrap();

        assert_eq!(logged.new_pr, new_pr);
        assert_eq!(logged.set.date, "2024-03-01");
        assert_eq!(logged.set.weight, Weight::new(weight).unwrap());
        assert_eq!(
            block_on(service.get_sets()).unwrap().last(),
            Some(&logged.set)
        );
        assert_eq!(
            block_on(service.get_sets()).unwrap().len(),
            history.len() + 1
        );
    }

    #[test]
    fn test_log_set_assigns_unique_ids() {
        let service = Service::new(Repository::default());

        let a = block_on(service.log_set(new_set(135.0, Some(8)))).unwrap();
        let b = block_on(service.log_set(new_set(135.0, Some(8)))).unwrap();

        assert_ne!(a.set.id, b.set.id);
        assert!(a.set.created_at_instant().is_some());
    }

    #[test]
    fn test_delete_set() {
        let service = Service::new(Repository::default());
        let logged = block_on(service.log_set(new_set(135.0, Some(8)))).unwrap();

        assert_eq!(
            block_on(service.delete_set(logged.set.id.clone())).unwrap(),
            logged.set.id
        );
        assert_eq!(block_on(service.get_sets()).unwrap(), vec![]);
        assert!(block_on(service.delete_set(logged.set.id)).is_ok());
    }

    #[rstest]
    #[case::merge(
        MuscleUpdate::Merge(Muscles::from([(Muscle::Triceps.into(), stimulus(1.0))])),
        &[(Muscle::Chest, 1.0), (Muscle::Triceps, 1.0), (Muscle::Shoulders, 0.25)]
    )]
    #[case::replace(
        MuscleUpdate::Replace(Muscles::from([(Muscle::Triceps.into(), stimulus(1.0))])),
        &[(Muscle::Triceps, 1.0)]
    )]
    fn test_update_exercise_muscles(
        #[case] update: MuscleUpdate,
        #[case] expected: &[(Muscle, f64)],
    ) {
        let service = Service::new(Repository {
            exercises: Mutex::new(vec![Exercise {
                name: "Bench Press".to_string(),
                muscles: Muscles::from([
                    (Muscle::Chest.into(), stimulus(1.0)),
                    (Muscle::Triceps.into(), stimulus(0.5)),
                    (Muscle::Shoulders.into(), stimulus(0.25)),
                ]),
            }]),
            ..Repository::default()
        });
        let expected = expected
            .iter()
            .map(|(m, v)| (MuscleKey::from(*m), stimulus(*v)))
            .collect::<Muscles>();

        let exercise = block_on(service.update_exercise_muscles("Bench Press", update)).unwrap();

        assert_eq!(exercise.muscles, expected);
        assert_eq!(
            block_on(service.get_exercises()).unwrap()[0].muscles,
            expected
        );
    }

    #[test]
    fn test_update_exercise_muscles_not_found() {
        let service = Service::new(Repository::default());

        assert!(matches!(
            block_on(
                service.update_exercise_muscles("Bench Press", MuscleUpdate::Merge(Muscles::new()))
            ),
            Err(UpdateError::NotFound)
        ));
    }

    #[test]
    fn test_create_and_validate_exercise() {
        let service = Service::new(Repository::default());

        let exercise =
            block_on(service.create_exercise(Name::new("Deadlift").unwrap())).unwrap();

        assert_eq!(exercise.muscles, Muscles::new());
        assert!(matches!(
            block_on(service.validate_exercise_name(" Deadlift ")),
            Err(crate::ValidationError::Conflict(field)) if field == "name"
        ));
        assert_eq!(
            block_on(service.validate_exercise_name("Squat")).unwrap(),
            Name::new("Squat").unwrap()
        );
        assert!(block_on(service.validate_exercise_name("  ")).is_err());
    }

    #[test]
    fn test_session() {
        let service = Service::new(Repository::default());
        let session = Session {
            account: "ethan@example.com".to_string(),
            access_token: "token".to_string(),
        };

        assert!(matches!(
            block_on(service.get_session()),
            Err(ReadError::Storage(StorageError::NoSession))
        ));
        assert_eq!(block_on(service.sign_in(session.clone())).unwrap(), session);
        assert_eq!(block_on(service.get_session()).unwrap(), session);
        block_on(service.sign_out()).unwrap();
        assert!(block_on(service.get_session()).is_err());
    }
}
