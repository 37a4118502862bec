#![allow(clippy::missing_errors_doc)]

use std::{
    collections::{BTreeMap, VecDeque},
    sync::Mutex,
};

use ::log::warn;
use serde::{Serialize, de::DeserializeOwned};
use yawt_app::{Settings, log, log::Repository as _};
use yawt_domain::{self as domain, ExerciseRepository as _, SetRepository as _};

pub const KEY_SETS: &str = "workout_sets";
pub const KEY_EXERCISES: &str = "workout_exercises";
pub const KEY_SETTINGS: &str = "settings";
pub const KEY_LOG: &str = "log";
pub const KEY_SESSION: &str = "session";
/// Marker of the one-time import of legacy data.
pub const KEY_CSV_IMPORTED: &str = "csv_v1_imported";

/// A store of JSON values, e.g. the local storage of a browser.
pub trait KeyValueStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, domain::StorageError>;
    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), domain::StorageError>;
    fn delete(&self, key: &str) -> Result<(), domain::StorageError>;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, serde_json::Value>>,
}

impl MemoryStore {
    fn entries(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, serde_json::Value>>, domain::StorageError>
    {
        self.entries
            .lock()
            .map_err(|err| domain::StorageError::Other(err.to_string().into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, domain::StorageError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), domain::StorageError> {
        self.entries()?.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), domain::StorageError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub struct BrowserStore;

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, domain::StorageError> {
        use gloo_storage::Storage as _;

        match gloo_storage::LocalStorage::get(key) {
            Ok(value) => Ok(Some(value)),
            Err(gloo_storage::errors::StorageError::KeyNotFound(_)) => Ok(None),
            Err(err) => Err(domain::StorageError::Other(Box::new(err))),
        }
    }

    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), domain::StorageError> {
        use gloo_storage::Storage as _;

        gloo_storage::LocalStorage::set(key, value)
            .map_err(|err| domain::StorageError::Other(Box::new(err)))
    }

    fn delete(&self, key: &str) -> Result<(), domain::StorageError> {
        use gloo_storage::Storage as _;

        gloo_storage::LocalStorage::delete(key);
        Ok(())
    }
}

/// Sets, exercises, settings, log entries and the session kept in a key-value store.
pub struct LocalStorage<K> {
    store: K,
}

impl<K: KeyValueStore> LocalStorage<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, domain::StorageError> {
        self.store
            .get(key)?
            .map(serde_json::from_value)
            .transpose()
            .map_err(|err| domain::StorageError::Other(Box::new(err)))
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), domain::StorageError> {
        let value =
            serde_json::to_value(value).map_err(|err| domain::StorageError::Other(Box::new(err)))?;
        self.store.set(key, value)
    }

    fn read_stored_sets(&self) -> Result<Vec<Set>, domain::StorageError> {
        Ok(self.read::<Vec<Set>>(KEY_SETS)?.unwrap_or_default())
    }

    /// All stored sets, including those that fail validation. Invalid weights are read as 0.
    pub fn read_all_sets(&self) -> Result<Vec<domain::Set>, domain::StorageError> {
        Ok(self
            .read_stored_sets()?
            .into_iter()
            .map(Set::into_lenient)
            .collect())
    }

    fn write_exercises(&self, exercises: &[domain::Exercise]) -> Result<(), domain::StorageError> {
        self.write(
            KEY_EXERCISES,
            &exercises.iter().map(Exercise::from).collect::<Vec<_>>(),
        )
    }

    /// Remove all locally stored sets.
    pub fn clear_sets(&self) -> Result<(), domain::StorageError> {
        self.store.delete(KEY_SETS)?;
        self.store.delete(KEY_CSV_IMPORTED)
    }
}

impl<K: KeyValueStore> domain::SetRepository for LocalStorage<K> {
    async fn read_sets(&self) -> Result<Vec<domain::Set>, domain::ReadError> {
        Ok(self
            .read_stored_sets()?
            .into_iter()
            .filter_map(|set| {
                let id = set.id.clone();
                domain::Set::try_from(set)
                    .inspect_err(|err| warn!("ignored stored set {id}: {err}"))
                    .ok()
            })
            .collect())
    }

    async fn create_set(&self, set: domain::Set) -> Result<domain::Set, domain::CreateError> {
        let mut sets = self.read_stored_sets()?;
        if sets.iter().any(|s| s.id == set.id.as_str()) {
            return Err(domain::CreateError::Conflict);
        }
        sets.push(Set::from(&set));
        self.write(KEY_SETS, &sets)?;
        Ok(set)
    }

    async fn delete_set(&self, id: domain::SetID) -> Result<domain::SetID, domain::DeleteError> {
        let mut sets = self.read_stored_sets()?;
        sets.retain(|s| s.id != id.as_str());
        self.write(KEY_SETS, &sets)?;
        Ok(id)
    }
}

impl<K: KeyValueStore> domain::ExerciseRepository for LocalStorage<K> {
    /// The default catalog is stored on first access.
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        if let Some(exercises) = self.read::<Vec<Exercise>>(KEY_EXERCISES)? {
            return Ok(exercises.into_iter().map(domain::Exercise::from).collect());
        }
        let exercises = domain::catalog::exercises();
        self.write_exercises(&exercises)?;
        Ok(exercises)
    }

    async fn create_exercise(
        &self,
        name: domain::Name,
    ) -> Result<domain::Exercise, domain::CreateError> {
        let mut exercises = self.read_exercises().await?;
        if exercises.iter().any(|e| e.name == name.as_str()) {
            return Err(domain::CreateError::Conflict);
        }
        let exercise = domain::Exercise::new(name);
        exercises.push(exercise.clone());
        self.write_exercises(&exercises)?;
        Ok(exercise)
    }

    async fn replace_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::UpdateError> {
        let mut exercises = self.read_exercises().await?;
        let existing = exercises
            .iter_mut()
            .find(|e| e.name == exercise.name)
            .ok_or(domain::UpdateError::NotFound)?;
        existing.clone_from(&exercise);
        self.write_exercises(&exercises)?;
        Ok(exercise)
    }
}

impl<K: KeyValueStore> domain::SessionRepository for LocalStorage<K> {
    async fn request_session(
        &self,
        session: domain::Session,
    ) -> Result<domain::Session, domain::ReadError> {
        self.write(KEY_SESSION, &Session::from(&session))?;
        Ok(session)
    }

    async fn initialize_session(&self) -> Result<domain::Session, domain::ReadError> {
        Ok(self
            .read::<Session>(KEY_SESSION)?
            .ok_or(domain::ReadError::Storage(domain::StorageError::NoSession))?
            .into())
    }

    async fn delete_session(&self) -> Result<(), domain::DeleteError> {
        Ok(self.store.delete(KEY_SESSION)?)
    }
}

impl<K: KeyValueStore> yawt_app::SettingsRepository for LocalStorage<K> {
    async fn read_settings(&self) -> Result<Settings, String> {
        self.read::<Settings>(KEY_SETTINGS)
            .map(Option::unwrap_or_default)
            .map_err(|err| err.to_string())
    }

    async fn write_settings(&self, settings: Settings) -> Result<(), String> {
        self.write(KEY_SETTINGS, &settings)
            .map_err(|err| err.to_string())
    }
}

impl<K: KeyValueStore> log::Repository for LocalStorage<K> {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        self.read::<VecDeque<log::Entry>>(KEY_LOG)
            .map(Option::unwrap_or_default)
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        log::prepend(&mut entries, entry);
        self.write(KEY_LOG, &entries)
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Set {
    pub id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub exercise: String,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: String,
}

impl From<&domain::Set> for Set {
    fn from(value: &domain::Set) -> Self {
        Self {
            id: value.id.to_string(),
            date: value.date.clone(),
            user: value.user.clone(),
            exercise: value.exercise.clone(),
            reps: value.reps.map(u32::from),
            weight: value.weight.into(),
            notes: value.notes.clone(),
            created_at: value.created_at.clone(),
        }
    }
}

impl TryFrom<Set> for domain::Set {
    type Error = SetError;

    fn try_from(value: Set) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            date: value.date,
            user: value.user,
            exercise: value.exercise,
            reps: value.reps.map(domain::Reps::new),
            weight: domain::Weight::new(value.weight)?,
            notes: value.notes,
            created_at: value.created_at,
        })
    }
}

impl Set {
    fn into_lenient(self) -> domain::Set {
        let weight = domain::Weight::new(self.weight).unwrap_or_else(|err| {
            warn!("replaced weight {} of stored set {} by 0: {err}", self.weight, self.id);
            domain::Weight::default()
        });
        domain::Set {
            id: self.id.into(),
            date: self.date,
            user: self.user,
            exercise: self.exercise,
            reps: self.reps.map(domain::Reps::new),
            weight,
            notes: self.notes,
            created_at: self.created_at,
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SetError {
    #[error(transparent)]
    Weight(#[from] domain::WeightError),
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct Exercise {
    pub name: String,
    #[serde(default)]
    pub muscles: BTreeMap<String, f64>,
}

impl From<&domain::Exercise> for Exercise {
    fn from(value: &domain::Exercise) -> Self {
        Self {
            name: value.name.clone(),
            muscles: value
                .muscles
                .iter()
                .map(|(key, stimulus)| (key.to_string(), **stimulus))
                .collect(),
        }
    }
}

impl From<Exercise> for domain::Exercise {
    fn from(value: Exercise) -> Self {
        Self {
            muscles: value
                .muscles
                .into_iter()
                .filter_map(|(key, stimulus)| {
                    Some((
                        domain::MuscleKey::from(key.as_str()),
                        domain::Stimulus::new(stimulus).ok()?,
                    ))
                })
                .collect(),
            name: value.name,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub account: String,
    pub access_token: String,
}

impl From<&domain::Session> for Session {
    fn from(value: &domain::Session) -> Self {
        Self {
            account: value.account.clone(),
            access_token: value.access_token.clone(),
        }
    }
}

impl From<Session> for domain::Session {
    fn from(value: Session) -> Self {
        Self {
            account: value.account,
            access_token: value.access_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;
    use yawt_app::{SettingsRepository, log::Repository as _};
    use yawt_domain::{ExerciseRepository, SessionRepository, SetRepository};

    use crate::tests::data::{EXERCISE, EXERCISES, SESSION, SET, SET_WITHOUT_REPS, SETS};

    use super::*;

    fn storage(entries: &[(&str, serde_json::Value)]) -> LocalStorage<MemoryStore> {
        let store = MemoryStore::default();
        for (key, value) in entries {
            store.set(key, value.clone()).unwrap();
        }
        LocalStorage::new(store)
    }

    #[test]
    fn test_set_serde() {
        assert_eq!(
            json!(Set::from(&*SET)),
            json!({
                "id": "a1b2",
                "date": "2024-03-01",
                "user": "Ethan",
                "exercise": "Bench Press",
                "reps": 8,
                "weight": 135.0,
                "notes": "felt strong",
                "createdAt": "2024-03-01T09:00:00.000Z"
            })
        );
        assert_eq!(json!(Set::from(&*SET_WITHOUT_REPS))["reps"], json!(null));
    }

    #[rstest]
    #[case::valid(&SET)]
    #[case::without_reps(&SET_WITHOUT_REPS)]
    fn test_set_try_from(#[case] set: &domain::Set) {
        assert_eq!(domain::Set::try_from(Set::from(set)), Ok(set.clone()));
    }

    #[test]
    fn test_set_try_from_many_reps() {
        let mut set = Set::from(&*SET);
        set.reps = Some(1500);

        assert_eq!(
            domain::Set::try_from(set).map(|s| s.reps.map(u32::from)),
            Ok(Some(1500))
        );
    }

    #[test]
    fn test_set_try_from_invalid() {
        let mut set = Set::from(&*SET);
        set.weight = -1.0;

        assert_eq!(
            domain::Set::try_from(set),
            Err(SetError::Weight(domain::WeightError::OutOfRange))
        );
    }

    #[test]
    fn test_exercise_from() {
        assert_eq!(
            domain::Exercise::from(Exercise::from(&*EXERCISE)),
            *EXERCISE
        );
        assert_eq!(
            json!(Exercise::from(&*EXERCISE)),
            json!({
                "name": "Bench Press",
                "muscles": {"chest": 1.0, "shoulders": 0.25, "triceps": 0.5}
            })
        );
    }

    #[test]
    fn test_read_sets() {
        let storage = storage(&[(
            KEY_SETS,
            json!([
                Set::from(&*SET),
                {"id": "broken", "weight": -5},
                Set::from(&*SET_WITHOUT_REPS)
            ]),
        )]);

        assert_eq!(block_on(storage.read_sets()).unwrap(), *SETS);
    }

    #[test]
    fn test_read_sets_empty() {
        assert_eq!(block_on(storage(&[]).read_sets()).unwrap(), vec![]);
    }

    #[test]
    fn test_read_sets_malformed() {
        let storage = storage(&[(KEY_SETS, json!("not a list"))]);

        assert!(matches!(
            block_on(storage.read_sets()),
            Err(domain::ReadError::Storage(domain::StorageError::Other(_)))
        ));
    }

    #[test]
    fn test_create_and_delete_set() {
        let storage = storage(&[]);

        block_on(storage.create_set(SET.clone())).unwrap();
        block_on(storage.create_set(SET_WITHOUT_REPS.clone())).unwrap();

        assert_eq!(block_on(storage.read_sets()).unwrap(), *SETS);
        assert!(matches!(
            block_on(storage.create_set(SET.clone())),
            Err(domain::CreateError::Conflict)
        ));

        block_on(storage.delete_set(SET.id.clone())).unwrap();
        block_on(storage.delete_set("unknown".into())).unwrap();

        assert_eq!(
            block_on(storage.read_sets()).unwrap(),
            vec![SET_WITHOUT_REPS.clone()]
        );
    }

    #[test]
    fn test_create_and_delete_set_keep_invalid_records() {
        let invalid = json!({"id": "broken", "date": "2024-02-28", "weight": -5});
        let storage = storage(&[(KEY_SETS, json!([invalid]))]);

        block_on(storage.create_set(SET.clone())).unwrap();

        assert_eq!(
            storage.store.get(KEY_SETS).unwrap().unwrap()[0]["id"],
            json!("broken")
        );

        block_on(storage.delete_set(SET.id.clone())).unwrap();

        assert_eq!(
            storage.store.get(KEY_SETS).unwrap().unwrap().as_array().map(Vec::len),
            Some(1)
        );
        assert_eq!(block_on(storage.read_sets()).unwrap(), vec![]);
    }

    #[test]
    fn test_read_all_sets() {
        let storage = storage(&[(
            KEY_SETS,
            json!([
                Set::from(&*SET),
                {"id": "broken", "date": "2024-02-28", "reps": 5, "weight": -5}
            ]),
        )]);

        let sets = storage.read_all_sets().unwrap();

        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0], *SET);
        assert_eq!(sets[1].id.as_str(), "broken");
        assert_eq!(sets[1].date, "2024-02-28");
        assert_eq!(sets[1].reps.map(u32::from), Some(5));
        assert_eq!(sets[1].weight, domain::Weight::default());
    }

    #[test]
    fn test_read_exercises_seeds_catalog() {
        let storage = storage(&[]);

        assert_eq!(
            block_on(storage.read_exercises()).unwrap(),
            domain::catalog::exercises()
        );
        assert!(storage.store.get(KEY_EXERCISES).unwrap().is_some());
    }

    #[test]
    fn test_read_exercises_stored() {
        let storage = storage(&[(
            KEY_EXERCISES,
            json!(EXERCISES.iter().map(Exercise::from).collect::<Vec<_>>()),
        )]);

        assert_eq!(block_on(storage.read_exercises()).unwrap(), *EXERCISES);
    }

    #[test]
    fn test_read_exercises_empty_list_not_seeded() {
        let storage = storage(&[(KEY_EXERCISES, json!([]))]);

        assert_eq!(block_on(storage.read_exercises()).unwrap(), vec![]);
    }

    #[test]
    fn test_create_exercise() {
        let storage = storage(&[(KEY_EXERCISES, json!([]))]);

        let exercise =
            block_on(storage.create_exercise(domain::Name::new("Deadlift").unwrap())).unwrap();

        assert_eq!(block_on(storage.read_exercises()).unwrap(), vec![exercise]);
        assert!(matches!(
            block_on(storage.create_exercise(domain::Name::new("Deadlift").unwrap())),
            Err(domain::CreateError::Conflict)
        ));
    }

    #[test]
    fn test_replace_exercise() {
        let storage = storage(&[]);
        let mut exercise = block_on(storage.read_exercises()).unwrap()[1].clone();
        exercise.muscles = domain::Muscles::new();

        block_on(storage.replace_exercise(exercise.clone())).unwrap();

        assert_eq!(block_on(storage.read_exercises()).unwrap()[1], exercise);
        assert!(matches!(
            block_on(storage.replace_exercise(EXERCISE.clone())),
            Err(domain::UpdateError::NotFound)
        ));
    }

    #[test]
    fn test_session() {
        let storage = storage(&[]);

        assert!(matches!(
            block_on(storage.initialize_session()),
            Err(domain::ReadError::Storage(domain::StorageError::NoSession))
        ));
        assert_eq!(
            block_on(storage.request_session(SESSION.clone())).unwrap(),
            *SESSION
        );
        assert_eq!(
            storage.store.get(KEY_SESSION).unwrap(),
            Some(json!({"account": "ethan@example.com", "accessToken": "ya29.token"}))
        );
        assert_eq!(block_on(storage.initialize_session()).unwrap(), *SESSION);

        block_on(storage.delete_session()).unwrap();

        assert!(block_on(storage.initialize_session()).is_err());
    }

    #[test]
    fn test_settings() {
        let storage = storage(&[]);
        assert_eq!(block_on(storage.read_settings()), Ok(Settings::default()));

        let mut settings = Settings::default();
        settings.add_user(domain::Name::new("Mia").unwrap()).unwrap();
        block_on(storage.write_settings(settings.clone())).unwrap();

        assert_eq!(block_on(storage.read_settings()), Ok(settings));
    }

    #[test]
    fn test_log() {
        let storage = storage(&[]);
        let entry = |message: &str| log::Entry {
            time: "Mar 01 09:00:00".to_string(),
            level: ::log::Level::Warn,
            message: message.to_string(),
        };

        storage.write_entry(entry("a")).unwrap();
        storage.write_entry(entry("b")).unwrap();

        assert_eq!(
            storage.read_entries(),
            Ok(VecDeque::from([entry("b"), entry("a")]))
        );
    }

    #[test]
    fn test_clear_sets() {
        let storage = storage(&[
            (KEY_SETS, json!([Set::from(&*SET)])),
            (KEY_CSV_IMPORTED, json!(true)),
            (KEY_SETTINGS, json!(Settings::default())),
        ]);

        storage.clear_sets().unwrap();

        assert_eq!(storage.store.get(KEY_SETS).unwrap(), None);
        assert_eq!(storage.store.get(KEY_CSV_IMPORTED).unwrap(), None);
        assert!(storage.store.get(KEY_SETTINGS).unwrap().is_some());
    }
}
