//! Opening repertoire storage and editing on top of `chess-core`.

pub mod config;
pub mod error;
pub mod repository;
pub mod store;
pub mod transfer;

pub use config::Config;
pub use error::{ImportFormatError, RepertoireError, StoreError};
pub use repository::{LineUpdate, NoteInput, NoteInputs, OpeningRepository};
pub use store::{JsonFileStore, MemoryStore, Storage, DATA_FILE_PATH};
pub use transfer::{export_file_name, export_json, parse_import};
