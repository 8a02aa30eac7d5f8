pub mod exporter;
pub mod filename;

pub use exporter::{ExportError, SnapshotFormat, export_document_bytes, export_snapshot, export_text};
pub use filename::sanitize_filename;
