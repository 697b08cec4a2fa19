#![forbid(unsafe_code)]

//! Reader/writer for the buddy-allocator + B-tree directory metadata
//! container format.
//!
//! [`Container`] is the entry point: [`Container::read`] parses a byte
//! buffer into a record set, mutating methods add and remove records by
//! `(filename, typeCode)` identity, and [`Container::write`] rebuilds the
//! on-disk structure from scratch — a fresh allocator, a fresh B-tree, and
//! freshly computed free lists. The format never supports in-place patching.

pub mod address;
pub mod allocator;
pub mod btree;
pub mod container;
pub mod cursor;
pub mod diagnostics;
pub mod error;
pub mod fourcc;
pub mod freelist;
pub mod layout;
pub mod ordering;
pub mod record;
pub mod value;
pub mod values;

pub use container::Container;
pub use diagnostics::Diagnostic;
pub use error::{Error, Result};
pub use fourcc::FourCc;
pub use record::Record;
pub use value::RecordValue;
