//! Leadflow Storage - Key-value document store abstraction
//!
//! This crate provides the persistence layer for Leadflow: a `KvStore`
//! capability (file-backed or in-memory) and typed repositories over the
//! JSON collections the pipeline reads and writes.

pub mod keys;
pub mod kv;
pub mod models;
pub mod repository;

pub use kv::{create_store, FileKvStore, KvStore, MemoryKvStore};
pub use models::*;
pub use repository::*;
