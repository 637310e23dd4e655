#![forbid(unsafe_code)]

//! Editor core for `jotpad`: document lifecycle, autosave, settings and file
//! ingestion, with no UI toolkit types.
//!
//! Everything mutable lives in one [`Editor`]. Front ends read it through
//! accessors and drive it through its operations, passing the current
//! [`std::time::Instant`] in so timers stay deterministic.

pub mod caret;
pub mod counts;
pub mod document;
pub mod editor;
pub mod error;
pub mod export;
pub mod ingest;
pub mod schedule;
pub mod settings;
pub mod store;
pub mod welcome;

pub use caret::{ApproximateMeasure, CaretEstimator, CaretMeasure, CaretPoint, CellMeasure};
pub use counts::{Counts, TextKind};
pub use document::Document;
pub use editor::{AutosaveStatus, Editor, Effect, PendingAction, Phase, Resolution};
pub use error::{EditorError, MeasureError, SettingsError, StoreError};
pub use export::DownloadSink;
pub use ingest::IncomingFile;
pub use schedule::DeferredTask;
pub use settings::Settings;
pub use store::{EphemeralStore, MemoryStore};

/// Hard cap on the size of a file we will open, and of content we will
/// write to the ephemeral store.
pub const MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;
