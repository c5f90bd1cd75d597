// ============================================================================
// spark-links - Scheduling
// The cooperative flush loop: tasks, renders, effects, until idle
// ============================================================================
//
// There is no background thread and no microtask queue. State setters only
// enqueue; nothing re-renders until the embedder calls flush(). One pass:
//
//   1. poll tasks whose wakers fired
//   2. re-render components with queued state
//   3. run effects scheduled by those renders
//
// Passes repeat until one does no work. A pass limit guards against effects
// that keep invalidating themselves.
// ============================================================================

use crate::core::context::with_context;
use crate::core::error::HostError;
use crate::host::executor::run_ready_tasks;

/// Work performed by one [`flush`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Passes executed, including the final idle one
    pub passes: u32,
    /// Component renders
    pub renders: usize,
    /// Effect runs
    pub effects: usize,
    /// Task polls
    pub polls: usize,
}

impl FlushStats {
    /// Whether the flush found nothing to do.
    pub fn is_idle(&self) -> bool {
        self.renders == 0 && self.effects == 0 && self.polls == 0
    }
}

/// Resets the flushing flag even if a render or effect panics.
struct FlushGuard;

impl Drop for FlushGuard {
    fn drop(&mut self) {
        with_context(|ctx| ctx.set_flushing(false));
    }
}

/// Drive this thread's host until no work remains.
///
/// # Errors
///
/// - [`HostError::ReentrantFlush`] if called from inside a render, effect, or
///   task poll.
/// - [`HostError::FlushLimitExceeded`] if work is still being produced after
///   [`HostConfig::max_flush_passes`](crate::HostConfig) passes. Remaining
///   work stays queued.
///
/// # Example
///
/// ```
/// use spark_links::{flush, mount, use_state_link};
///
/// let app = mount(|cx| use_state_link(cx, 0));
/// app.output().set(3);
///
/// let stats = flush().unwrap();
/// assert_eq!(stats.renders, 1);
/// assert_eq!(*app.output().value(), 3);
/// ```
pub fn flush() -> Result<FlushStats, HostError> {
    if with_context(|ctx| ctx.set_flushing(true)) {
        return Err(HostError::ReentrantFlush);
    }
    let _guard = FlushGuard;

    let limit = with_context(|ctx| ctx.config.get().max_flush_passes);
    let mut stats = FlushStats::default();

    loop {
        if stats.passes >= limit {
            tracing::error!(passes = stats.passes, "flush limit exceeded");
            return Err(HostError::FlushLimitExceeded {
                passes: stats.passes,
            });
        }
        stats.passes += 1;

        let polls = run_ready_tasks();
        let renders = render_dirty();
        let effects = run_effects();

        stats.polls += polls;
        stats.renders += renders;
        stats.effects += effects;

        if polls + renders + effects == 0 {
            break;
        }
    }

    tracing::trace!(
        passes = stats.passes,
        renders = stats.renders,
        effects = stats.effects,
        polls = stats.polls,
        "flush settled"
    );
    Ok(stats)
}

fn render_dirty() -> usize {
    let dirty = with_context(|ctx| ctx.take_dirty());
    dirty
        .into_iter()
        .filter_map(|weak| weak.upgrade())
        .filter(|component| component.render())
        .count()
}

fn run_effects() -> usize {
    let queued = with_context(|ctx| ctx.take_effects());
    queued
        .into_iter()
        .filter_map(|weak| weak.upgrade())
        .map(|component| component.run_effects())
        .sum()
}

// =============================================================================
// TESTS
// =============================================================================
