use std::fs::{self, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use tempfile::NamedTempFile;
use tracing::info;

use super::{CrateStore, CrateStoreError};
use crate::pinned_track::PinnedTrack;

static CRATE_FILE: &str = "pinned_crate.json";

/// Pinned tracks stored as a JSON array. Saves replace the file in one rename.
#[derive(Clone, Debug)]
pub struct FileCrateStore {
    path: PathBuf,
}

impl FileCrateStore {
    pub fn try_new() -> Result<Box<dyn CrateStore + Send + Sync>, CrateStoreError> {
        let proj_dirs =
            directories::ProjectDirs::from("", "", "namedrop").ok_or(CrateStoreError::NoHomeDir)?;
        FileCrateStore::new_from_path(proj_dirs.config_dir().join(CRATE_FILE))
    }

    pub fn new_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Box<dyn CrateStore + Send + Sync>, CrateStoreError> {
        let path = path.as_ref();
        let path_string = path.to_string_lossy().to_string();
        if path.is_dir() {
            return Err(CrateStoreError::NotAFile(path_string));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir_all(parent)
                .map_err(|e| CrateStoreError::DirCreationFailed(path_string.clone(), e))?;
        }

        info!("Using crate file {path_string}");
        Ok(Box::new(Self {
            path: path.to_owned(),
        }))
    }
}

impl CrateStore for FileCrateStore {
    fn load(&self) -> Result<Vec<PinnedTrack>> {
        if !self.path.exists() {
            return Ok(vec![]);
        }
        let contents = fs::read_to_string(&self.path)
            .wrap_err_with(|| format!("Error reading crate file {:?}", self.path))?;
        if contents.trim().is_empty() {
            return Ok(vec![]);
        }

        serde_json::from_str(&contents)
            .wrap_err_with(|| format!("Crate file {:?} is not valid JSON", self.path))
    }

    fn save(&self, tracks: &[PinnedTrack]) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut file = NamedTempFile::new_in(dir).wrap_err("Error creating temp crate file")?;
        {
            let mut writer = BufWriter::new(file.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, tracks)
                .wrap_err("Error serializing crate")?;
            writer.flush().wrap_err("Error flushing crate file")?;
        }

        file.persist(&self.path)
            .wrap_err_with(|| format!("Error replacing crate file {:?}", self.path))?;
        Ok(())
    }
}
