#![allow(clippy::missing_errors_doc)]

use std::{collections::BTreeMap, sync::Mutex};

use log::debug;
use strum::AsRefStr;
use yawt_domain as domain;

use crate::row::{Cell, Row, exercise_to_row, row_to_exercise, row_to_set, set_to_row};

/// Access to the rows of a spreadsheet.
///
/// Row indices are zero-based and include the header row at index 0.
#[allow(async_fn_in_trait)]
pub trait Spreadsheet {
    async fn read_rows(&self, tab: Tab) -> Result<Vec<Row>, domain::StorageError>;
    async fn append_rows(&self, tab: Tab, rows: Vec<Row>) -> Result<(), domain::StorageError>;
    async fn update_row(&self, tab: Tab, index: usize, row: Row)
    -> Result<(), domain::StorageError>;
    async fn delete_row(&self, tab: Tab, index: usize) -> Result<(), domain::StorageError>;
}

#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tab {
    #[strum(serialize = "Sets")]
    Sets,
    #[strum(serialize = "Exercises")]
    Exercises,
}

impl Tab {
    #[must_use]
    pub fn range(self) -> &'static str {
        match self {
            Tab::Sets => "A:H",
            Tab::Exercises => "A:B",
        }
    }

    #[must_use]
    pub fn header(self) -> Row {
        let columns: &[&str] = match self {
            Tab::Sets => &[
                "id",
                "date",
                "user",
                "exercise",
                "reps",
                "weight",
                "notes",
                "createdAt",
            ],
            Tab::Exercises => &["name", "muscles"],
        };
        columns.iter().map(|c| Cell::from(*c)).collect()
    }
}

/// A spreadsheet held in memory, starting with a header row in each tab.
pub struct MemorySpreadsheet {
    tabs: Mutex<BTreeMap<Tab, Vec<Row>>>,
}

impl MemorySpreadsheet {
    #[must_use]
    pub fn new() -> Self {
        Self::with_rows(vec![Tab::Sets.header()], vec![Tab::Exercises.header()])
    }

    /// Rows are taken as they are, i.e. the first row of each tab is treated as header.
    #[must_use]
    pub fn with_rows(sets: Vec<Row>, exercises: Vec<Row>) -> Self {
        Self {
            tabs: Mutex::new(BTreeMap::from([
                (Tab::Sets, sets),
                (Tab::Exercises, exercises),
            ])),
        }
    }

    fn modify<T>(
        &self,
        tab: Tab,
        f: impl FnOnce(&mut Vec<Row>) -> Result<T, domain::StorageError>,
    ) -> Result<T, domain::StorageError> {
        let mut tabs = self
            .tabs
            .lock()
            .map_err(|err| domain::StorageError::Other(err.to_string().into()))?;
        f(tabs.entry(tab).or_default())
    }
}

impl Default for MemorySpreadsheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Spreadsheet for MemorySpreadsheet {
    async fn read_rows(&self, tab: Tab) -> Result<Vec<Row>, domain::StorageError> {
        self.modify(tab, |rows| Ok(rows.clone()))
    }

    async fn append_rows(&self, tab: Tab, rows: Vec<Row>) -> Result<(), domain::StorageError> {
        self.modify(tab, |existing| {
            existing.extend(rows);
            Ok(())
        })
    }

    async fn update_row(
        &self,
        tab: Tab,
        index: usize,
        row: Row,
    ) -> Result<(), domain::StorageError> {
        self.modify(tab, |rows| {
            let existing = rows.get_mut(index).ok_or_else(|| out_of_range(tab, index))?;
            *existing = row;
            Ok(())
        })
    }

    async fn delete_row(&self, tab: Tab, index: usize) -> Result<(), domain::StorageError> {
        self.modify(tab, |rows| {
            if index >= rows.len() {
                return Err(out_of_range(tab, index));
            }
            rows.remove(index);
            Ok(())
        })
    }
}

fn out_of_range(tab: Tab, index: usize) -> domain::StorageError {
    domain::StorageError::Other(format!("row {index} of {} out of range", tab.as_ref()).into())
}

/// Sets and exercises stored in the tabs of a spreadsheet.
pub struct SheetStorage<S> {
    sheet: S,
}

impl<S: Spreadsheet> SheetStorage<S> {
    pub fn new(sheet: S) -> Self {
        Self { sheet }
    }

    pub fn sheet(&self) -> &S {
        &self.sheet
    }

    /// Append all sets in a single batch.
    pub async fn append_sets(&self, sets: &[domain::Set]) -> Result<(), domain::CreateError> {
        self.sheet
            .append_rows(Tab::Sets, sets.iter().map(set_to_row).collect())
            .await?;
        Ok(())
    }

    /// Index of the first data row whose key column matches `key`.
    async fn find_row(&self, tab: Tab, key: &str) -> Result<Option<usize>, domain::StorageError> {
        Ok(self
            .sheet
            .read_rows(tab)
            .await?
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, row)| row.first().is_some_and(|cell| cell.text() == key))
            .map(|(index, _)| index))
    }
}

impl<S: Spreadsheet> domain::SetRepository for SheetStorage<S> {
    async fn read_sets(&self) -> Result<Vec<domain::Set>, domain::ReadError> {
        Ok(self
            .sheet
            .read_rows(Tab::Sets)
            .await?
            .iter()
            .skip(1)
            .map(|row| row_to_set(row))
            .filter(|set| !set.id.is_empty())
            .collect())
    }

    async fn create_set(&self, set: domain::Set) -> Result<domain::Set, domain::CreateError> {
        if self.find_row(Tab::Sets, &set.id).await?.is_some() {
            return Err(domain::CreateError::Conflict);
        }
        self.sheet
            .append_rows(Tab::Sets, vec![set_to_row(&set)])
            .await?;
        Ok(set)
    }

    async fn delete_set(&self, id: domain::SetID) -> Result<domain::SetID, domain::DeleteError> {
        match self.find_row(Tab::Sets, &id).await? {
            Some(index) => self.sheet.delete_row(Tab::Sets, index).await?,
            None => debug!("set {id} to delete not found"),
        }
        Ok(id)
    }
}

impl<S: Spreadsheet> domain::ExerciseRepository for SheetStorage<S> {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        Ok(self
            .sheet
            .read_rows(Tab::Exercises)
            .await?
            .iter()
            .skip(1)
            .map(|row| row_to_exercise(row))
            .filter(|exercise| !exercise.name.is_empty())
            .collect())
    }

    async fn create_exercise(
        &self,
        name: domain::Name,
    ) -> Result<domain::Exercise, domain::CreateError> {
        if self
            .find_row(Tab::Exercises, name.as_str())
            .await?
            .is_some()
        {
            return Err(domain::CreateError::Conflict);
        }
        let exercise = domain::Exercise::new(name);
        self.sheet
            .append_rows(Tab::Exercises, vec![exercise_to_row(&exercise)])
            .await?;
        Ok(exercise)
    }

    async fn replace_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::UpdateError> {
        let index = self
            .find_row(Tab::Exercises, &exercise.name)
            .await?
            .ok_or(domain::UpdateError::NotFound)?;
        self.sheet
            .update_row(Tab::Exercises, index, exercise_to_row(&exercise))
            .await?;
        Ok(exercise)
    }
}
