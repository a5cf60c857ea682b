//! Secret and certificate retrieval for keyscope.
//!
//! This crate turns the fragments selected by `keyscope-config` into entries,
//! fetches their keys from local files, etcd, Consul or a remote HTTP file
//! store, and keeps the results in write-once stores that never expose secret
//! bytes through `Debug` or serialization.
//!
//! Retrieval is best-effort: a key that cannot be fetched is logged and left
//! absent, and callers must check for it explicitly.

pub mod backend;
pub mod context;
pub mod entry;
pub mod error;
pub mod registry;
pub mod retriever;
pub mod store;

pub use backend::Backend;
pub use context::{CancellationToken, RetrieveContext};
pub use entry::{CERT_ENTRY_TYPE, CRED_ENTRY_TYPE, CertEntry, CredEntry};
pub use error::{ClientError, Result};
pub use registry::{EntryRegistry, RegisteredEntry};
pub use retriever::{CertRetriever, CredRetriever};
pub use store::{CertStore, SecretStore};
