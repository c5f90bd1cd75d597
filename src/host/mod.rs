// ============================================================================
// spark-links - Host Module
// The minimal render/effect runtime links are built on: components with
// ordered hook slots, queued state, dependency-keyed effects, a local task
// executor, and the flush loop that drives them
// ============================================================================

pub mod component;
pub mod effect;
pub mod executor;
pub mod scheduling;
pub mod state;

pub use component::{mount, Component, RenderFn, Scope};
pub use executor::{active_task_count, has_ready_tasks, spawn_local, TaskId};
pub use scheduling::{flush, FlushStats};
pub use state::{StateCell, StateSetter};
