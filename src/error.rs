use thiserror::Error;

/// Main error type for datasweep.
/// Aggregates errors from the standard library, dependencies, and the crate's
/// own invariants. Errors are local to the file or operation that raised them;
/// a failed file never aborts the rest of an upload batch.
#[derive(Error, Debug)]
pub enum Error {
    /// File extension not in {csv, xlsx}, or an unrecognized conversion target.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// An operation referenced a file name that was never registered.
    /// Registration always precedes cleaning in the command flow, so hitting
    /// this means the caller skipped `register`.
    #[error("no table registered under '{0}'")]
    NotFound(String),

    #[error("{0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Excel: {0}")]
    Excel(String),

    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    #[error("chart: {0}")]
    Chart(String),

    #[error("{0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
