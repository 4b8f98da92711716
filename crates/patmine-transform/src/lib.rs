pub mod cleaner;
pub mod datetime;
pub mod inference;
pub mod numeric;
pub mod validate;

pub use cleaner::{CleaningPlan, clean_and_transform, derive_kind_features, numeric_column_stats};
pub use datetime::{DateParts, parse_date, value_to_date};
pub use inference::{SAMPLE_SIZE, classify_sample, detect_column_types};
pub use numeric::{CONSTANT_BIN, ColumnStats, discretize};
pub use validate::{CleanedDataValidation, validate_cleaned_data};
