use std::env;
use std::path::PathBuf;

use crate::store::DATA_FILE_PATH;

#[derive(Clone, Debug)]
pub struct Config {
    /// JSON file holding the whole opening collection.
    pub data_path: PathBuf,
    /// Directory for dated exports.
    pub export_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            data_path: env::var("REPERTOIRE_DATA")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DATA_FILE_PATH)),
            export_dir: env::var("REPERTOIRE_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}
