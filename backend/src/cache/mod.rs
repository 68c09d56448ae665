//! Grid Store - Local geoid grid files
//!
//! Keeps the GTX grids needed by orthometric vertical datums in one
//! directory, loads them for the engine and can download missing ones.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{GridError, GridResult};
use crate::geodesy::{GeoidGrid, GeoidModels};
use crate::models::VerticalDatum;

/// Directory where grids are stored (relative to current dir)
pub const DEFAULT_GRID_DIR: &str = ".camconv/grids";

/// Presence of one grid file on disk
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridStatus {
    pub datum: VerticalDatum,
    pub file: String,
    pub present: bool,
    /// File size in bytes, when present
    pub size: Option<u64>,
}

/// Store for geoid grid files
#[derive(Debug, Clone)]
pub struct GridStore {
    /// Directory where grids are stored
    grid_dir: PathBuf,
    /// Base URL grids are downloaded from (`{url}/{file}`)
    source_url: Option<String>,
}

impl GridStore {
    /// Create a store over a directory
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            grid_dir: PathBuf::from(dir.as_ref()),
            source_url: None,
        }
    }

    /// Set the download base URL
    pub fn with_source(mut self, url: Option<String>) -> Self {
        self.source_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.grid_dir
    }

    fn path_for(&self, file: &str) -> PathBuf {
        self.grid_dir.join(file)
    }

    /// Status of every grid file a vertical datum needs
    pub fn list(&self) -> Vec<GridStatus> {
        VerticalDatum::ALL
            .into_iter()
            .filter_map(|datum| datum.grid_file().map(|file| (datum, file)))
            .map(|(datum, file)| {
                let meta = fs::metadata(self.path_for(file)).ok().filter(|m| m.is_file());
                GridStatus {
                    datum,
                    file: file.to_string(),
                    present: meta.is_some(),
                    size: meta.map(|m| m.len()),
                }
            })
            .collect()
    }

    /// Grid files not yet on disk
    pub fn missing(&self) -> Vec<GridStatus> {
        self.list().into_iter().filter(|s| !s.present).collect()
    }

    /// Load every grid present on disk.
    ///
    /// Missing grids are skipped (the engine reports them when a datum
    /// needs one); a present but corrupt grid is an error.
    pub fn load_models(&self) -> GridResult<GeoidModels> {
        let mut models = GeoidModels::new();
        for status in self.list() {
            if !status.present {
                warn!(file = %status.file, datum = %status.datum, "Geoid grid not found");
                continue;
            }
            let grid = GeoidGrid::from_file(&self.path_for(&status.file))?;
            info!(file = %status.file, datum = %status.datum, "Loaded geoid grid");
            models.insert(status.datum, grid);
        }
        Ok(models)
    }

    /// Download missing grids from the configured URL.
    ///
    /// Returns the names of the files fetched. Each download is validated
    /// as GTX before it is written.
    pub async fn sync(&self) -> GridResult<Vec<String>> {
        let missing = self.missing();
        if missing.is_empty() {
            return Ok(Vec::new());
        }
        let base = self.source_url.as_deref().ok_or(GridError::NoSource)?;
        fs::create_dir_all(&self.grid_dir)?;

        let client = reqwest::Client::new();
        let mut fetched = Vec::new();
        for status in missing {
            let url = format!("{}/{}", base.trim_end_matches('/'), status.file);
            info!(%url, "Downloading geoid grid");

            let download = |e: reqwest::Error| GridError::Download {
                file: status.file.clone(),
                message: e.to_string(),
            };
            let bytes = client
                .get(&url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(download)?
                .bytes()
                .await
                .map_err(download)?;

            GeoidGrid::from_bytes(&status.file, &bytes)?;
            fs::write(self.path_for(&status.file), &bytes)?;
            fetched.push(status.file);
        }
        Ok(fetched)
    }
}

impl Default for GridStore {
    fn default() -> Self {
        Self::with_dir(DEFAULT_GRID_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::geoid::tests::small_grid;
    use tempfile::tempdir;

    #[test]
    fn test_list_reports_missing() {
        let dir = tempdir().unwrap();
        let store = GridStore::with_dir(dir.path());

        let list = store.list();
        assert_eq!(list.len(), 3);
        assert!(list.iter().all(|s| !s.present));
        assert_eq!(store.missing().len(), 3);
    }

    #[test]
    fn test_load_present_grids() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("CGG2013an83.gtx"), small_grid()).unwrap();
        let store = GridStore::with_dir(dir.path());

        let status = store.list();
        let cgg = status.iter().find(|s| s.datum == VerticalDatum::Cgg2013a).unwrap();
        assert!(cgg.present);
        assert_eq!(cgg.size, Some(small_grid().len() as u64));

        let models = store.load_models().unwrap();
        assert_eq!(models.datums(), vec![VerticalDatum::Cgg2013a]);
    }

    #[test]
    fn test_corrupt_grid_is_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("HT2_2010v70.gtx"), b"not a grid").unwrap();
        let store = GridStore::with_dir(dir.path());
        assert!(matches!(store.load_models(), Err(GridError::InvalidGrid { .. })));
    }

    #[tokio::test]
    async fn test_sync_without_source() {
        let dir = tempdir().unwrap();
        let store = GridStore::with_dir(dir.path()).with_source(Some("  ".to_string()));
        assert!(matches!(store.sync().await, Err(GridError::NoSource)));
    }
}
