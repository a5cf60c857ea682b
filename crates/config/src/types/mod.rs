//! Boot configuration type definitions.
//!
//! Responsibilities:
//! - Define the boot document schema (credential and certificate fragments).
//! - Define provider kinds, connection parameters and retrieval timeouts.
//! - Provide serialization helpers for sensitive values.
//!
//! Does NOT handle:
//! - Loading the document from disk or the environment (see `loader`).
//! - Locale filtering (see `selection`).
//! - Fetching anything (see the client crate).
//!
//! Invariants:
//! - Passwords and tokens use `secrecy::SecretString` and are redacted on
//!   `Debug` and `Serialize`.

mod auth;
mod connection;
mod fragment;

pub use auth::{BasicAuth, REDACTED};
pub use connection::{Connection, ProviderKind, RetrieveSettings};
pub use fragment::{
    BootConfig, CertBlockEntry, CertFragment, CertPaths, CertSection, CertSlot, CredFragment,
    Fragment, FragmentProblem,
};
