//! Storage Layer
//!
//! Resolves the platform directories for configuration and for the
//! persisted recent-plates list.

use anyhow::Result;
use directories::ProjectDirs;
use std::path::PathBuf;

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "platewatch", "PlateWatch")
        .ok_or_else(|| anyhow::anyhow!("Could not determine platform directories"))
}

/// Get the application data directory, creating it if needed
pub fn get_data_dir() -> Result<PathBuf> {
    let dir = project_dirs()?.data_dir().to_path_buf();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Get the configuration directory, creating it if needed
pub fn get_config_dir() -> Result<PathBuf> {
    let dir = project_dirs()?.config_dir().to_path_buf();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Path of the persisted recent-plates list
pub fn history_file() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("recent_plates.json"))
}
