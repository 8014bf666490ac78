//! Durable index storage.
//!
//! One JSON record per (project, language), replaced atomically on
//! every write.
//!
//! # Architecture
//!
//! - **IndexStore**: put/get/list/delete keyed by project + language
//! - **atomic**: temp-file-and-rename writes

mod atomic;
mod store;

pub use atomic::atomic_write;
pub use store::{decode_project, encode_project, IndexKey, IndexStore, IndexSummary, RecordStamp};
