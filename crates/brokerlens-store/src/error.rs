use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record dump not found: {0}")]
    FileNotFound(std::path::PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON on line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("record error: {0}")]
    Record(#[from] brokerlens_core::RecordError),
}
