// ============================================================================
// spark-links - Host Configuration
// ============================================================================

use super::context::with_context;

/// Default number of flush passes before the host reports a runaway loop.
pub const DEFAULT_MAX_FLUSH_PASSES: u32 = 1000;

/// Per-thread host settings.
///
/// # Example
///
/// ```
/// use spark_links::{configure, host_config, HostConfig};
///
/// configure(HostConfig { max_flush_passes: 16 });
/// assert_eq!(host_config().max_flush_passes, 16);
/// configure(HostConfig::default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostConfig {
    /// Upper bound on render/effect/task passes within one `flush()`.
    /// An effect that keeps re-triggering itself hits this instead of spinning.
    pub max_flush_passes: u32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_flush_passes: DEFAULT_MAX_FLUSH_PASSES,
        }
    }
}

impl HostConfig {
    /// Builder-style override of the pass limit. Zero is clamped to one.
    pub fn with_max_flush_passes(mut self, passes: u32) -> Self {
        self.max_flush_passes = passes.max(1);
        self
    }
}

/// Install a configuration for the current thread's host.
pub fn configure(config: HostConfig) {
    with_context(|ctx| ctx.config.set(config));
}

/// The configuration currently in effect on this thread.
pub fn host_config() -> HostConfig {
    with_context(|ctx| ctx.config.get())
}
