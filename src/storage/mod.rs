//! Scan result persistence.
//!
//! Append-only SQLite storage with retrieval of the most recent entries.

mod sqlite;

pub use sqlite::{get_last, init_db, save_results, ScanStore};
