//! Storage collaborator boundary.
//!
//! The vault hands a [`RecordStore`] fully assembled [`SecureStorageRecord`]s
//! and queries them back by opaque index tokens only. Atomicity of a write and
//! its unique-token check is the store's responsibility.

mod error;
mod memory;
mod record;
mod store;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryRecordStore;
pub use record::{RecordPayload, SecureStorageRecord};
pub use store::RecordStore;
