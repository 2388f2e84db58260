//! Upload ingest: CSV reading, schema normalization, and multi-file merge.

pub mod merge;
pub mod normalize;
pub mod table;

pub use merge::{ingest_files, ingest_with, merge_normalized};
pub use normalize::{normalize, ColumnAlias, SchemaNormalizer, CONFIDENCE_ALIASES};
pub use table::{RawTable, UploadedFile};
