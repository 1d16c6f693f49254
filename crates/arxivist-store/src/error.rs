use std::path::PathBuf;

use arxivist_core::MatrixError;
use thiserror::Error;

/// Startup-fatal failures while making sure the asset set is on disk.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("models are missing and an archive was configured, but it was not found: {0}")]
    ArchiveNotFound(PathBuf),

    #[error(
        "required model files are missing\nMODELS_DIR={base_dir}\nMissing:\n{}\n\n\
         Fix options:\n\
         1) Put the model files into {base_dir}\n\
         2) Set MODELS_DIR to the folder containing the models\n\
         3) Set MODELS_ZIP_PATH to a local zip and restart",
        bullet_list(.missing)
    )]
    MissingAssets {
        base_dir: PathBuf,
        missing: Vec<PathBuf>,
    },

    #[error(
        "extracted {archive} but required files are still missing (check the archive layout):\n{}",
        bullet_list(.missing)
    )]
    IncompleteAfterExtract {
        archive: PathBuf,
        missing: Vec<PathBuf>,
    },

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn bullet_list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("- {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Failures reading an artifact that is present but unusable.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("embedding matrix: {0}")]
    Matrix(#[from] MatrixError),

    #[error("{0}")]
    Schema(String),
}
