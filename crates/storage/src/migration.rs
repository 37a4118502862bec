use log::info;
use yawt_domain as domain;

use crate::{
    local_storage::{KeyValueStore, LocalStorage},
    sheet::{SheetStorage, Spreadsheet},
};

/// Move all locally stored sets into the spreadsheet.
///
/// The sets are appended in a single batch and removed from the local store afterwards. Stored
/// records that fail validation are moved as well. Returns the number of moved sets.
pub async fn migrate_sets<K: KeyValueStore, S: Spreadsheet>(
    local: &LocalStorage<K>,
    sheet: &SheetStorage<S>,
) -> Result<usize, domain::CreateError> {
    let sets = local.read_all_sets()?;

    if sets.is_empty() {
        return Ok(0);
    }

    sheet.append_sets(&sets).await?;
    local.clear_sets()?;

    info!("migrated {} sets to spreadsheet", sets.len());

    Ok(sets.len())
}
