//! Export and import of ranked patterns.
//!
//! Export always yields a document; import never fails on content and
//! answers an empty list for anything it cannot read.

pub mod export;

pub use export::{
    EXPORT_VERSION, ExportMetadata, PatternExport, export_patterns_to_json,
    import_patterns_from_json, read_pattern_export, write_pattern_export,
};
