//! Directory backed by local JSON fixtures, for tests and offline work.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;

use super::error::DirectoryError;
use super::types::RawRestroom;
use super::RestroomDirectory;

/// In-memory directory. Either built from a fixture directory where each
/// `{station}.json` file holds an array of records, or from rows directly.
pub struct MockDirectory {
    by_station: HashMap<String, Vec<RawRestroom>>,
}

impl MockDirectory {
    /// Load every `*.json` file under `dir`; the file stem is the station name.
    pub fn from_dir(dir: &Path) -> Result<Self, std::io::Error> {
        let mut by_station = HashMap::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let contents = std::fs::read_to_string(&path)?;
            let rows: Vec<RawRestroom> = serde_json::from_str(&contents)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            by_station.insert(stem.to_owned(), rows);
        }
        Ok(Self { by_station })
    }

    /// Build from rows, grouping by station name.
    pub fn with_rows(rows: Vec<RawRestroom>) -> Self {
        let mut by_station: HashMap<String, Vec<RawRestroom>> = HashMap::new();
        for row in rows {
            by_station.entry(row.station.clone()).or_default().push(row);
        }
        Self { by_station }
    }
}

#[async_trait]
impl RestroomDirectory for MockDirectory {
    async fn fetch_restrooms(
        &self,
        station: Option<&str>,
    ) -> Result<Vec<RawRestroom>, DirectoryError> {
        match station {
            Some(name) => Ok(self.by_station.get(name).cloned().unwrap_or_default()),
            None => {
                let mut all: Vec<RawRestroom> =
                    self.by_station.values().flatten().cloned().collect();
                // Deterministic order regardless of map iteration.
                all.sort_by(|a, b| a.station.cmp(&b.station));
                Ok(all)
            }
        }
    }
}
