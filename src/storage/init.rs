//! First-run setup

use crate::config::paths::TrackerPaths;
use crate::error::TrackerResult;
use crate::models::default_categories;

use super::categories::CategoryData;
use super::data_file::DataFile;

/// Prepare the data directory; seeds the default categories on a fresh install
///
/// Returns `true` when the defaults were written.
pub fn initialize_storage(paths: &TrackerPaths) -> TrackerResult<bool> {
    paths.ensure_directories()?;

    let file = DataFile::new(paths.categories_file());
    if file.exists() {
        return Ok(false);
    }

    let data = CategoryData {
        categories: default_categories(),
    };
    file.save(&data)?;
    tracing::info!(count = data.categories.len(), "seeded default categories");

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::data_file::DataFile;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_seeds_once() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert!(initialize_storage(&paths).unwrap());
        let data: CategoryData = DataFile::new(paths.categories_file()).load().unwrap();
        assert_eq!(data.categories.len(), 16);

        // A second run leaves existing categories alone
        assert!(!initialize_storage(&paths).unwrap());
    }
}
