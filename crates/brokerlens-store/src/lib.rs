//! Input supply: raw broker records read from a JSON array or JSON Lines dump.

mod error;
pub use error::StoreError;

mod dump;
pub use dump::{DumpFormat, RecordDump};
