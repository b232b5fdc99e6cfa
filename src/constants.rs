//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

use std::time::Duration;

/// Application name, also used for the config and data directories
pub const APP_NAME: &str = "apiprobe";

/// Default base location of a remote execution backend
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Default log file name (inside the data directory)
pub const DEFAULT_LOG_FILE: &str = "apiprobe.log";

/// Config file name (inside the config directory)
pub const CONFIG_FILE: &str = "config.yaml";

/// Number of completed dispatches kept in history
pub const HISTORY_CAPACITY: usize = 10;

/// Persistence key for the history sequence
pub const HISTORY_KEY: &str = "history";

/// Persistence key for the saved request sequence
pub const SAVED_REQUESTS_KEY: &str = "saved_requests";

/// Timeout applied by the in-process executor to HTTP and GraphQL calls
pub const EXECUTOR_TIMEOUT: Duration = Duration::from_secs(30);

/// How long the in-process executor listens for WebSocket replies by default
pub const WS_LISTEN_WINDOW: Duration = Duration::from_secs(5);

/// Gap between outgoing WebSocket messages
pub const WS_SEND_GAP: Duration = Duration::from_millis(100);

/// Entries kept by the in-process executor's GET response cache
pub const CACHE_MAX_CAPACITY: u64 = 1000;

/// Lifetime of a cached GET response
pub const CACHE_TIME_TO_LIVE: Duration = Duration::from_secs(300);
