#![warn(clippy::pedantic)]

#[allow(clippy::module_name_repetitions)]
pub mod local_storage;
pub mod migration;
pub mod row;
pub mod sheet;

pub use local_storage::{KeyValueStore, LocalStorage, MemoryStore};
#[cfg(target_arch = "wasm32")]
pub use local_storage::BrowserStore;
pub use migration::migrate_sets;
pub use row::{Cell, Row};
pub use sheet::{MemorySpreadsheet, SheetStorage, Spreadsheet, Tab};
