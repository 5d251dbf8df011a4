//! Storage collaborator for persisted records
//!
//! Features:
//! - Key/value storage of JSON documents
//! - Atomic file writes (tmp → rename)
//! - In-memory backend for tests and headless runs
//!
//! Read and write failures are reported as [`StorageError`]; callers in the
//! session layer log them and continue with empty data.

mod storage;

pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
