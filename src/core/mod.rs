// ============================================================================
// spark-links - Core Module
// Shared types, errors, configuration, and the thread-local host context
// ============================================================================

pub mod config;
pub mod context;
pub mod error;
pub mod types;

pub use config::{configure, host_config, HostConfig, DEFAULT_MAX_FLUSH_PASSES};
pub use context::{is_flushing, pending_update_count, with_context, HostContext};
pub use error::{HostError, PersistError};
pub use types::{AnyComponent, ApplyFn, CleanupFn, Commit, SetAction};
