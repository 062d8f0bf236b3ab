//! Export of classified comments.
//!
//! [`serialize`] encodes comments as CSV or JSON; [`ExportStore`] writes the
//! resulting bytes into the configured data directory.

pub mod error;
pub mod serialize;
pub mod storage;

pub use error::{SerializationError, StorageError};
pub use serialize::{serialize, serialize_report, ExportFormat, EXPORT_COLUMNS};
pub use storage::{ExportStore, SavedFiles};
