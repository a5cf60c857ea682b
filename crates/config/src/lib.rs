//! Boot configuration for keyscope.
//!
//! This crate decides which configuration fragments apply to the running
//! deployment environment and produces the typed boot document that secret
//! and certificate retrieval is driven from:
//!
//! - [`locale`]: `realm::region::az::domain` selectors and environment matching.
//! - [`value`], [`merge`], [`overrides`]: a closed value tree, deep merge and
//!   flat `key=value` override strings.
//! - [`types`]: the boot document schema.
//! - [`selection`]: locale filtering and duplicate-name resolution.
//! - `loader`: the `BootConfigLoader` builder.

pub mod constants;
pub mod locale;
mod loader;
pub mod merge;
pub mod overrides;
pub mod selection;
pub mod types;
pub mod value;

pub use loader::{BootConfigLoader, ConfigError, LoadedBoot, env_var_or_none};
pub use locale::{Environment, LocaleSpec};
pub use merge::{merge, merged};
pub use overrides::{OverrideError, expand_dotted, parse_flat_overrides};
pub use selection::select_fragments;
pub use types::{
    BasicAuth, BootConfig, CertFragment, CertPaths, CertSlot, Connection, CredFragment,
    Fragment, ProviderKind, RetrieveSettings,
};
pub use value::{Record, Scalar, Value};
