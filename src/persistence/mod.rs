pub mod file;

use thiserror::Error;

use crate::errors::LayoutError;

pub use file::{
    load_snapshot_from_csv, load_snapshot_from_json, save_layout_to_json, save_snapshot_to_csv,
    save_snapshot_to_json,
};

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;
