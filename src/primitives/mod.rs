// ============================================================================
// spark-links - Primitives Module
// Links and the hooks that build them: value link, state link, safe link,
// bound links, mount tracker, async readiness
// ============================================================================

pub mod bound;
pub mod link;
pub mod mount;
pub mod ready;
pub mod safe;
pub mod state_link;

// Re-export for convenience
pub use bound::{use_bound_link, use_safe_bound_link, LinkSource};
pub use link::Link;
pub use mount::{use_mount_tracker, MountHandle};
pub use ready::{use_async_ready, use_async_status, ReadyState};
pub use safe::{guard_commit, use_safe_link, SafeCommit};
pub use state_link::{use_state_link, StateCommit};
