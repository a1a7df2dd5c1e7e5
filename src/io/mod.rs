//! I/O handling
//!
//! - `schema`: header alias resolution (pure, no I/O)
//! - `reader`: CSV ingestion into canonical row batches
//! - `report`: per-run outcome ledger in CSV form

pub mod reader;
pub mod report;
pub mod schema;

pub use reader::read_batch;
pub use report::{report_path, write_report};
pub use schema::SchemaMap;
