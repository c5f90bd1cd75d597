// ============================================================================
// spark-links - Value Links for Hook-Based Components
// ============================================================================
//
// A link pairs a component's current value with a way to ask for a new one.
// Links are built by hooks at render time and handed around in place of
// getter/setter pairs:
//
// - use_state_link      local state as a link
// - use_safe_link       ...that ignores writes after teardown
// - use_bound_link      local state that follows a source value
// - use_async_ready     one race-free flag over overlapping async work
// - use_persisted_links save/restore a LinkSet through a Storage
//
// The crate carries the small single-threaded host these hooks run on
// (components, state cells, effects, a local executor, flush()).
// ============================================================================

//! Value links over a minimal hook runtime.
//!
//! ```
//! use spark_links::{flush, mount, use_safe_link, SetAction};
//!
//! let app = mount(|cx| use_safe_link(cx, 0));
//!
//! let count = app.output();
//! count.set(SetAction::apply(|n| n + 1));
//! count.update(|n| Some(*n * 10));
//! flush().unwrap();
//! assert_eq!(*app.output().value(), 10);
//!
//! app.unmount();
//! count.set(99); // absorbed
//! assert_eq!(*app.output().value(), 10);
//! ```

#[macro_use]
mod macros;

pub mod collections;
pub mod core;
pub mod host;
pub mod persist;
pub mod primitives;

// Re-export core items at crate root for ergonomic access
pub use crate::core::config::{configure, host_config, HostConfig, DEFAULT_MAX_FLUSH_PASSES};
pub use crate::core::context::{is_flushing, pending_update_count};
pub use crate::core::error::{HostError, PersistError};
pub use crate::core::types::{ApplyFn, CleanupFn, Commit, SetAction};

// Host runtime
pub use host::component::{mount, Component, Scope};
pub use host::executor::{active_task_count, spawn_local, TaskId};
pub use host::scheduling::{flush, FlushStats};
pub use host::state::StateSetter;

// Links and hooks
pub use primitives::bound::{use_bound_link, use_safe_bound_link, LinkSource};
pub use primitives::link::Link;
pub use primitives::mount::{use_mount_tracker, MountHandle};
pub use primitives::ready::{use_async_ready, use_async_status, ReadyState};
pub use primitives::safe::{guard_commit, use_safe_link, SafeCommit};
pub use primitives::state_link::{use_state_link, StateCommit};

// Collections and persistence
pub use collections::LinkSet;
pub use persist::{
    load_links, save_links, use_persisted_links, FileStorage, MemoryStorage, Storage,
};

// =============================================================================
// TESTS
// =============================================================================
