pub mod load;
pub mod merge;

pub use load::{load_csv_source, load_json_source, load_source, load_sources, typed_cell};
pub use merge::{SourceValidation, merge, merge_at, validate_sources};
