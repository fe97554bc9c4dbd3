use crate::errors::{Result, StorageError, StorageErrorType};
use directories::BaseDirs;
use std::path::{Path, PathBuf};

pub(crate) fn get_main_dir() -> Result<PathBuf> {
    let base_dir = BaseDirs::new().ok_or_else(|| {
        StorageError::new(
            StorageErrorType::IOError,
            "Could not determine the user's data directory".to_string(),
        )
    })?;
    let user_data_dir: &Path = base_dir.data_dir();
    let package_root: PathBuf = user_data_dir.join("breezy");
    if !package_root.exists() {
        std::fs::create_dir_all(&package_root)?;
    }
    Ok(package_root)
}

pub(crate) fn get_log_dir() -> Result<PathBuf> {
    let log_dir = get_main_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    Ok(log_dir)
}

pub(crate) fn get_socket_path() -> Result<PathBuf> {
    Ok(get_main_dir()?.join("breezy.sock"))
}
