use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store quota exceeded: {needed} bytes needed, {available} available")]
    QuotaExceeded { needed: usize, available: usize },
    #[error("store is unavailable")]
    Unavailable,
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("\"{name}\" is {size} bytes; files over {limit} bytes cannot be opened")]
    FileTooLarge { name: String, size: u64, limit: u64 },
    #[error("document is {bytes} bytes, over the {limit} byte autosave limit")]
    ContentTooLarge { bytes: usize, limit: u64 },
    #[error("failed to read \"{name}\"")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("an unsaved-changes confirmation is already open")]
    ConfirmationPending,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum MeasureError {
    #[error("no wrap width is known for the editing surface")]
    NoWrapWidth,
    #[error("wrap width {wrap_width} is narrower than one {cell_width} wide cell")]
    WrapTooNarrow { wrap_width: f32, cell_width: f32 },
    #[error("font metrics must be finite and positive")]
    BadMetrics,
    #[error("laid-out text no longer matches the document")]
    StaleLayout,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("malformed settings blob")]
    Json(#[from] serde_json::Error),
}
