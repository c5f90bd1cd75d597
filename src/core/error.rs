// ============================================================================
// spark-links - Error Types
// ============================================================================

use thiserror::Error;

/// Failures reported by the host scheduler.
#[derive(Debug, Error)]
pub enum HostError {
    /// The render/effect loop never went idle.
    #[error(
        "flush did not settle after {passes} passes; an effect is likely writing state it depends on"
    )]
    FlushLimitExceeded { passes: u32 },

    /// `flush()` was called from inside a render, effect, or task poll.
    #[error("flush called while a flush is already running")]
    ReentrantFlush,
}

/// Failures while moving link values to or from a store.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to encode link `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode link `{key}`: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed persisted data: {reason}")]
    Malformed { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PersistError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_key() {
        let source = serde_json::from_str::<i32>("\"x\"").unwrap_err();
        let err = PersistError::Decode {
            key: "count".into(),
            source,
        };
        assert!(err.to_string().contains("`count`"));
    }

    #[test]
    fn flush_limit_message() {
        let err = HostError::FlushLimitExceeded { passes: 7 };
        assert!(err.to_string().contains("7 passes"));
    }
}
