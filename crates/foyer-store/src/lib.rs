//! Persistence capability for Foyer.
//!
//! The lobby never talks to a database directly. It talks to a
//! [`DocumentStore`]: named collections of JSON documents supporting
//! get / create-if-absent / add-with-generated-id / field update / delete,
//! plus two atomic list operations (add-unique-element and remove-element).
//! Those two are the only mutations that several connections may race on,
//! so every backend must apply them without a client-side read-modify-write.
//!
//! [`MemoryStore`] is the in-process backend used by the binary and tests.
//! The typed record shapes in [`records`] describe what lives in each
//! collection.

mod error;
mod memory;
pub mod records;
mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::{DocKey, Document, DocumentStore};
