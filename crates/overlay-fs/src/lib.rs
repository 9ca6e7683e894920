//! Host environment abstraction for the overlay configuration engine
//!
//! Everything the engine needs from the outside world goes through this
//! crate: filesystem probes and reads, the configured search path, and the
//! monotonic clock used for staleness gating.

pub mod clock;
pub mod error;
pub mod fs;
pub mod search_path;

pub use clock::{Clock, SystemClock};
pub use error::{Error, Result};
pub use fs::{FileSystem, OsFileSystem};
pub use search_path::{SearchPath, CONFIG_PATH_ENV};
