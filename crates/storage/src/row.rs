//! Conversion between domain records and spreadsheet rows.
//!
//! Reading never fails. Cells that are missing or cannot be interpreted fall back to a default
//! value.

use std::collections::BTreeMap;

use log::warn;
use yawt_domain as domain;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    /// Numbers are rendered in their shortest decimal representation.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Cell::Number(number) => number.to_string(),
            Cell::Text(text) => text.clone(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Text(text) if text.is_empty())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

pub type Row = Vec<Cell>;

#[must_use]
pub fn set_to_row(set: &domain::Set) -> Row {
    vec![
        Cell::from(set.id.as_str()),
        Cell::from(set.date.as_str()),
        Cell::from(set.user.as_str()),
        Cell::from(set.exercise.as_str()),
        set.reps
            .map_or_else(|| Cell::from(""), |reps| Cell::from(f64::from(u32::from(reps)))),
        Cell::from(f64::from(set.weight)),
        Cell::from(set.notes.as_str()),
        Cell::from(set.created_at.as_str()),
    ]
}

#[must_use]
pub fn row_to_set(row: &[Cell]) -> domain::Set {
    let text = |index: usize| row.get(index).map(Cell::text).unwrap_or_default();
    let id = text(0);
    let reps = match row.get(4) {
        None => None,
        Some(cell) if cell.is_empty() => None,
        Some(cell) => match domain::Reps::try_from(cell.text().trim()) {
            Ok(reps) => Some(reps),
            Err(err) => {
                warn!("ignored reps {cell:?} of set {id}: {err}");
                None
            }
        },
    };
    let weight = match row.get(5) {
        None => domain::Weight::default(),
        Some(cell) if cell.is_empty() => domain::Weight::default(),
        Some(cell) => domain::Weight::try_from(cell.text().trim()).unwrap_or_else(|err| {
            warn!("replaced weight {cell:?} of set {id} by 0: {err}");
            domain::Weight::default()
        }),
    };

    domain::Set {
        id: id.into(),
        date: text(1),
        user: text(2),
        exercise: text(3),
        reps,
        weight,
        notes: text(6),
        created_at: text(7),
    }
}

#[must_use]
pub fn exercise_to_row(exercise: &domain::Exercise) -> Row {
    let muscles = exercise
        .muscles
        .iter()
        .map(|(key, stimulus)| (key.to_string(), **stimulus))
        .collect::<BTreeMap<_, _>>();
    let muscles = serde_json::to_string(&muscles).unwrap_or_else(|err| {
        warn!("failed to serialize muscles of {}: {err}", exercise.name);
        "{}".to_string()
    });

    vec![Cell::from(exercise.name.as_str()), Cell::Text(muscles)]
}

/// Malformed muscle profiles result in an exercise without muscles. Single entries with an
/// invalid stimulus are dropped.
#[must_use]
pub fn row_to_exercise(row: &[Cell]) -> domain::Exercise {
    let muscles = row
        .get(1)
        .and_then(|cell| {
            serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&cell.text()).ok()
        })
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| {
            let stimulus = domain::Stimulus::new(value.as_f64()?).ok()?;
            Some((domain::MuscleKey::from(key.as_str()), stimulus))
        })
        .collect::<domain::Muscles>();

    domain::Exercise {
        name: row.first().map(Cell::text).unwrap_or_default(),
        muscles,
    }
}
