use std::{
    fs, io,
    path::{Path, PathBuf},
};

use grid_builder_core::SaveData;
use thiserror::Error;

/// Errors raised while reading or writing the JSON save file.
#[derive(Debug, Error)]
pub(crate) enum SaveFileError {
    /// The save file exists but could not be read.
    #[error("could not read save file {}", path.display())]
    Read {
        /// Location of the save file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The save file does not hold a valid placement collection.
    #[error("could not parse save file {}", path.display())]
    Parse {
        /// Location of the save file.
        path: PathBuf,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
    /// The save file could not be written.
    #[error("could not write save file {}", path.display())]
    Write {
        /// Location of the save file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Reads the save file at `path`; a missing file yields an empty save.
pub(crate) fn load(path: &Path) -> Result<SaveData, SaveFileError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(SaveData::new()),
        Err(source) => {
            return Err(SaveFileError::Read {
                path: path.to_owned(),
                source,
            })
        }
    };

    serde_json::from_str(&contents).map_err(|source| SaveFileError::Parse {
        path: path.to_owned(),
        source,
    })
}

/// Writes `save` to `path` as pretty-printed JSON, creating parent folders.
pub(crate) fn store(path: &Path, save: &SaveData) -> Result<(), SaveFileError> {
    let write_error = |source| SaveFileError::Write {
        path: path.to_owned(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    let json = serde_json::to_string_pretty(save).map_err(|source| SaveFileError::Write {
        path: path.to_owned(),
        source: io::Error::from(source),
    })?;
    fs::write(path, json).map_err(write_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_builder_core::{AssetId, CellCoord, Direction, InstanceId, PlaceableObjectData};

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("grid-builder-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    fn sample() -> SaveData {
        [
            PlaceableObjectData::new(
                AssetId::new("house"),
                InstanceId::new("5a1e"),
                CellCoord::new(3, 4),
                Direction::Left,
            ),
            PlaceableObjectData::new(
                AssetId::new("grass"),
                InstanceId::new("77b0"),
                CellCoord::new(0, 0),
                Direction::Down,
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn missing_files_load_as_empty_saves() {
        let save = load(&scratch_path("absent.json")).expect("missing file is not an error");
        assert!(save.is_empty());
    }

    #[test]
    fn stored_saves_load_back() {
        let path = scratch_path("nested/save_file.json");
        let save = sample();
        store(&path, &save).expect("save is written");
        assert_eq!(load(&path).expect("save is read"), save);
        if let Some(root) = path.parent().and_then(Path::parent) {
            let _ = fs::remove_dir_all(root);
        }
    }

    #[test]
    fn reads_the_persisted_record_shape() {
        let path = scratch_path("save_file.json");
        let json = r#"{
            "placeableObjectDataCollection": {
                "5a1e": {
                    "assetIdentifier": "house",
                    "guid": "5a1e",
                    "direction": "Left",
                    "gridPosition": { "x": 3, "y": 0, "z": 4 }
                }
            }
        }"#;
        let parent = path.parent().expect("scratch path has a parent");
        fs::create_dir_all(parent).expect("scratch directory");
        fs::write(&path, json).expect("fixture is written");

        let save = load(&path).expect("fixture parses");
        let record = save
            .get(&InstanceId::new("5a1e"))
            .expect("record is keyed by guid");
        assert_eq!(record.cell(), CellCoord::new(3, 4));
        assert_eq!(record.direction, Direction::Left);
        let _ = fs::remove_dir_all(parent);
    }

    #[test]
    fn malformed_files_report_parse_errors() {
        let path = scratch_path("broken.json");
        let parent = path.parent().expect("scratch path has a parent");
        fs::create_dir_all(parent).expect("scratch directory");
        fs::write(&path, "{ not json").expect("fixture is written");

        let error = load(&path).expect_err("malformed json is rejected");
        assert!(matches!(error, SaveFileError::Parse { .. }));
        let _ = fs::remove_dir_all(parent);
    }
}
