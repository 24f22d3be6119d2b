use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database Error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Configuration Error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Dataset Error: {0}")]
    Dataset(String),

    #[error("Invalid assembly: {0}")]
    Assembly(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
