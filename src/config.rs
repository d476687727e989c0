//! Event loop configuration.
//!
//! Every field has a default, so a partial document deserializes:
//!
//! ```ignore
//! let config: EventLoopConfig = serde_json::from_str(r#"{ "poll_interval": { "secs": 0, "nanos": 5000000 } }"#)?;
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for an [`crate::EventLoop`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLoopConfig {
    /// Name given to the background producer thread.
    pub thread_name: String,

    /// How long `wait_timeout` sleeps between empty retries.
    ///
    /// Pushes wake a waiting consumer early, so this mostly bounds how often
    /// the inline pump runs when no background thread exists.
    pub poll_interval: Duration,

    /// Pause between pumps on the background producer thread.
    ///
    /// The producer is parked (safe to pause) during this window.
    pub producer_delay: Duration,

    /// Upper bound on waiting for the queue mutex before reporting
    /// `EventError::LockTimeout`.
    pub lock_timeout: Duration,

    /// Disable system window-manager messages when the loop starts.
    pub disable_sys_wm: bool,
}

impl Default for EventLoopConfig {
    fn default() -> Self {
        Self {
            thread_name: "spark-events".to_string(),
            poll_interval: Duration::from_millis(10),
            producer_delay: Duration::from_millis(1),
            lock_timeout: Duration::from_millis(250),
            disable_sys_wm: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EventLoopConfig::default();
        assert_eq!(config.thread_name, "spark-events");
        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert_eq!(config.producer_delay, Duration::from_millis(1));
        assert!(config.disable_sys_wm);
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let config: EventLoopConfig =
            serde_json::from_str(r#"{ "thread_name": "input-pump", "disable_sys_wm": false }"#).unwrap();
        assert_eq!(config.thread_name, "input-pump");
        assert!(!config.disable_sys_wm);
        assert_eq!(config.lock_timeout, EventLoopConfig::default().lock_timeout);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = EventLoopConfig {
            poll_interval: Duration::from_millis(3),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: EventLoopConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
